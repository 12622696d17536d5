//! Model Extractor: raw JRXML text -> normalized [`Report`].
//!
//! The extractor is deliberately lenient. Real-world documents disagree on
//! namespace prefixes, wrap collections one level deeper than expected, and
//! carry malformed numeric attributes; all of that degrades gracefully into
//! a renderable model instead of failing the parse. The only hard failures
//! are unreadable XML and the absence of any report root.

use crate::core::model::{Band, Element, Field, Group, Parameter, Report, Variable};
use crate::error::StructureError;
use crate::{ElementKind, Orientation};
use roxmltree::{Document, Node};

pub const DEFAULT_PAGE_WIDTH: i32 = 595;
pub const DEFAULT_PAGE_HEIGHT: i32 = 842;
pub const DEFAULT_MARGIN: i32 = 20;

/// Named band tags in canonical stacking order. Group header/footer bands
/// follow these, in group declaration order.
pub const BAND_TYPES: [&str; 10] = [
    "title",
    "pageHeader",
    "columnHeader",
    "detail",
    "columnFooter",
    "pageFooter",
    "summary",
    "background",
    "lastPageFooter",
    "noData",
];

const MAX_RESOLVE_DEPTH: usize = 6;

/// Parse raw document text into a fresh Report Model.
pub fn parse(raw: &str) -> Result<Report, StructureError> {
    let doc = Document::parse(raw)?;
    let root = find_report_root(&doc).ok_or(StructureError::MissingRoot)?;

    let mut report = Report {
        name: attr_or(root, "name", "Unnamed Report"),
        page_width: attr_int(root, "pageWidth", DEFAULT_PAGE_WIDTH),
        page_height: attr_int(root, "pageHeight", DEFAULT_PAGE_HEIGHT),
        orientation: Orientation::from_attr(&attr_or(root, "orientation", "Portrait")),
        column_width: attr_int(root, "columnWidth", 0),
        left_margin: attr_int(root, "leftMargin", DEFAULT_MARGIN),
        right_margin: attr_int(root, "rightMargin", DEFAULT_MARGIN),
        top_margin: attr_int(root, "topMargin", DEFAULT_MARGIN),
        bottom_margin: attr_int(root, "bottomMargin", DEFAULT_MARGIN),
        parameters: Vec::new(),
        fields: Vec::new(),
        variables: Vec::new(),
        groups: Vec::new(),
        bands: Vec::new(),
    };

    for param in resolve_all(root, "parameter") {
        report.parameters.push(Parameter {
            name: attr_or(param, "name", ""),
            class_name: attr_or(param, "class", ""),
            is_for_prompting: param.attribute("isForPrompting") == Some("true"),
            default_value_expression: child_text(param, "defaultValueExpression"),
        });
    }

    for field in resolve_all(root, "field") {
        report.fields.push(Field {
            name: attr_or(field, "name", ""),
            class_name: attr_or(field, "class", ""),
        });
    }

    for variable in resolve_all(root, "variable") {
        report.variables.push(Variable {
            name: attr_or(variable, "name", ""),
            class_name: attr_or(variable, "class", ""),
            calculation: attr_or(variable, "calculation", "Nothing"),
            expression: child_text(variable, "variableExpression"),
        });
    }

    let group_nodes = resolve_all(root, "group");
    for group in &group_nodes {
        report.groups.push(Group {
            name: attr_or(*group, "name", ""),
            expression: child_text(*group, "groupExpression").unwrap_or_default(),
        });
    }

    // Named bands first, in the fixed canonical order. A band-type container
    // may wrap one or more band nodes, or be the band itself.
    for band_type in BAND_TYPES {
        let Some(container) = resolve(root, band_type) else {
            continue;
        };
        let mut band_nodes = resolve_all(container, "band");
        if band_nodes.is_empty() {
            band_nodes.push(container);
        }
        for node in band_nodes {
            report.bands.push(build_band(band_type.to_string(), node));
        }
    }

    // Then group headers/footers, in group declaration order.
    for group in &group_nodes {
        let group_name = group
            .attribute("name")
            .filter(|n| !n.is_empty())
            .unwrap_or("group");
        if let Some(header) = child(*group, "groupHeader") {
            for node in resolve_all(header, "band") {
                report
                    .bands
                    .push(build_band(format!("groupHeader-{group_name}"), node));
            }
        }
        if let Some(footer) = child(*group, "groupFooter") {
            for node in resolve_all(footer, "band") {
                report
                    .bands
                    .push(build_band(format!("groupFooter-{group_name}"), node));
            }
        }
    }

    Ok(report)
}

fn build_band(band_type: String, node: Node) -> Band {
    Band {
        band_type,
        height: attr_int(node, "height", 0),
        elements: extract_elements(node),
    }
}

/// Elements of one band, read from its direct children only, in the fixed
/// kind order. Nested containers are out of scope here.
fn extract_elements(band: Node) -> Vec<Element> {
    let mut elements = Vec::new();
    for kind in ElementKind::EXTRACTED {
        for node in band
            .children()
            .filter(|c| c.is_element() && c.tag_name().name() == kind.tag())
        {
            if let Some(element) = build_element(kind.clone(), node) {
                elements.push(element);
            }
        }
    }
    elements
}

/// One element from its node. Returns `None` when the geometry carrier is
/// missing: an element without a `reportElement` has no position and cannot
/// be rendered or re-located.
fn build_element(kind: ElementKind, node: Node) -> Option<Element> {
    let geometry = resolve(node, "reportElement")?;
    let mut element = Element::new(
        kind.clone(),
        attr_int(geometry, "x", 0),
        attr_int(geometry, "y", 0),
        attr_int(geometry, "width", 0),
        attr_int(geometry, "height", 0),
    );

    match kind {
        ElementKind::StaticText => {
            element.text = Some(child_text(node, "text").unwrap_or_default());
            element.forecolor = attr_opt(geometry, "forecolor");
            element.backcolor = attr_opt(geometry, "backcolor");
            element.mode = attr_opt(geometry, "mode");
            apply_text_element(&mut element, node);
        }
        ElementKind::TextField => {
            element.expression = Some(child_text(node, "textFieldExpression").unwrap_or_default());
            element.pattern = attr_opt(node, "pattern");
            element.forecolor = attr_opt(geometry, "forecolor");
            element.backcolor = attr_opt(geometry, "backcolor");
            element.mode = attr_opt(geometry, "mode");
            apply_text_element(&mut element, node);
        }
        ElementKind::Rectangle => {
            element.backcolor = attr_opt(geometry, "backcolor");
            element.mode = attr_opt(geometry, "mode");
        }
        ElementKind::Subreport => {
            element.expression = Some(
                child_text(node, "subreportExpression")
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| "Subreport".to_string()),
            );
        }
        ElementKind::Chart => {
            element.expression = Some(attr_or(node, "chartType", "chart"));
        }
        ElementKind::Image | ElementKind::Line | ElementKind::Unknown(_) => {}
    }

    Some(element)
}

/// Typography carrier: optional, and every field it would supply stays unset
/// when it is absent. A `font` sub-node defaults its size to 10.
fn apply_text_element(element: &mut Element, node: Node) {
    let Some(text_element) = child(node, "textElement") else {
        return;
    };
    element.text_alignment = attr_opt(text_element, "textAlignment");
    element.vertical_alignment = attr_opt(text_element, "verticalAlignment");
    if let Some(font) = child(text_element, "font") {
        element.font_name = attr_opt(font, "fontName");
        element.font_size = Some(attr_int(font, "size", 10));
        element.is_bold = Some(font.attribute("isBold") == Some("true"));
    }
}

/// Root resolution: the document root if its local name contains
/// `jasperreport` case-insensitively, otherwise a bounded-depth search.
fn find_report_root<'a, 'input>(doc: &'a Document<'input>) -> Option<Node<'a, 'input>> {
    let root = doc.root_element();
    if name_matches(root.tag_name().name(), "jasperreport") {
        return Some(root);
    }
    find_fuzzy_descendant(root, "jasperreport", 0)
}

fn find_fuzzy_descendant<'a, 'input>(
    node: Node<'a, 'input>,
    target: &str,
    depth: usize,
) -> Option<Node<'a, 'input>> {
    if depth > MAX_RESOLVE_DEPTH {
        return None;
    }
    for c in node.children().filter(Node::is_element) {
        if name_matches(c.tag_name().name(), target) {
            return Some(c);
        }
        if let Some(found) = find_fuzzy_descendant(c, target, depth + 1) {
            return Some(found);
        }
    }
    None
}

/// Fuzzy key resolution, applied uniformly wherever a report-specific key is
/// read: exact child name first, then case-insensitive/substring child name,
/// then the exact name wrapped deeper (bounded recursion). The deeper search
/// stays exact on purpose: a substring match across levels would happily turn
/// a `textField` into a `field`.
pub(crate) fn resolve<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    if let Some(c) = child(node, name) {
        return Some(c);
    }
    if let Some(c) = node
        .children()
        .find(|c| c.is_element() && name_matches(c.tag_name().name(), name))
    {
        return Some(c);
    }
    resolve_wrapped(node, name, 0)
}

fn resolve_wrapped<'a, 'input>(
    node: Node<'a, 'input>,
    name: &str,
    depth: usize,
) -> Option<Node<'a, 'input>> {
    if depth > MAX_RESOLVE_DEPTH {
        return None;
    }
    for c in node.children().filter(Node::is_element) {
        if c.tag_name().name() == name {
            return Some(c);
        }
        if let Some(found) = resolve_wrapped(c, name, depth + 1) {
            return Some(found);
        }
    }
    None
}

/// Collection form of [`resolve`]: the first location that yields any match
/// supplies the whole sequence. Absent -> empty, singleton -> one, repeated
/// -> all, normalized independently at every call site.
pub(crate) fn resolve_all<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Vec<Node<'a, 'input>> {
    let exact: Vec<_> = node
        .children()
        .filter(|c| c.is_element() && c.tag_name().name() == name)
        .collect();
    if !exact.is_empty() {
        return exact;
    }
    let fuzzy: Vec<_> = node
        .children()
        .filter(|c| c.is_element() && name_matches(c.tag_name().name(), name))
        .collect();
    if !fuzzy.is_empty() {
        return fuzzy;
    }
    resolve_all_wrapped(node, name, 0)
}

fn resolve_all_wrapped<'a, 'input>(
    node: Node<'a, 'input>,
    name: &str,
    depth: usize,
) -> Vec<Node<'a, 'input>> {
    if depth > MAX_RESOLVE_DEPTH {
        return Vec::new();
    }
    for c in node.children().filter(Node::is_element) {
        let here: Vec<_> = c
            .children()
            .filter(|g| g.is_element() && g.tag_name().name() == name)
            .collect();
        if !here.is_empty() {
            return here;
        }
        let deeper = resolve_all_wrapped(c, name, depth + 1);
        if !deeper.is_empty() {
            return deeper;
        }
    }
    Vec::new()
}

fn name_matches(key: &str, target: &str) -> bool {
    key.eq_ignore_ascii_case(target)
        || key.to_ascii_lowercase().contains(&target.to_ascii_lowercase())
}

/// Direct child by exact local name. Namespace prefixes are already stripped
/// by the tree parser.
fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}

/// Trimmed text content (including CDATA) of an exact direct child.
fn child_text(node: Node, name: &str) -> Option<String> {
    let c = child(node, name)?;
    let mut out = String::new();
    for t in c.children() {
        if let Some(text) = t.text() {
            out.push_str(text);
        }
    }
    Some(out.trim().to_string())
}

/// Lenient integer coercion: absent or unparsable attributes fall back to the
/// documented default, never an error.
fn attr_int(node: Node, name: &str, default: i32) -> i32 {
    node.attribute(name)
        .and_then(|v| v.trim().parse::<i32>().ok())
        .unwrap_or(default)
}

fn attr_or(node: Node, name: &str, default: &str) -> String {
    node.attribute(name).unwrap_or(default).to_string()
}

fn attr_opt(node: Node, name: &str) -> Option<String> {
    node.attribute(name).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<jasperReport name="test" pageWidth="595" pageHeight="842" columnWidth="555">
{body}
</jasperReport>"#
        )
    }

    #[test]
    fn missing_root_is_a_structure_error() {
        let err = parse("<someOtherDocument/>").unwrap_err();
        assert!(matches!(err, StructureError::MissingRoot));
    }

    #[test]
    fn malformed_xml_is_a_structure_error() {
        let err = parse("<jasperReport><unclosed>").unwrap_err();
        assert!(matches!(err, StructureError::Malformed(_)));
    }

    #[test]
    fn namespaced_root_is_tolerated() {
        let xml = r#"<jr:jasperReport xmlns:jr="http://jasperreports.sourceforge.net/jasperreports" name="ns"/>"#;
        let report = parse(xml).unwrap();
        assert_eq!(report.name, "ns");
    }

    #[test]
    fn report_defaults_apply_when_attributes_are_missing() {
        let report = parse("<jasperReport/>").unwrap();
        assert_eq!(report.name, "Unnamed Report");
        assert_eq!(report.page_width, 595);
        assert_eq!(report.page_height, 842);
        assert_eq!(report.orientation, Orientation::Portrait);
        assert_eq!(report.column_width, 0);
        assert_eq!(report.left_margin, 20);
        assert_eq!(report.right_margin, 20);
        assert_eq!(report.top_margin, 20);
        assert_eq!(report.bottom_margin, 20);
    }

    #[test]
    fn malformed_numerics_fall_back_to_defaults() {
        let xml = r#"<jasperReport pageWidth="wide" leftMargin="">
            <title><band height="abc"/></title>
        </jasperReport>"#;
        let report = parse(xml).unwrap();
        assert_eq!(report.page_width, 595);
        assert_eq!(report.left_margin, 20);
        assert_eq!(report.bands[0].height, 0);
    }

    #[test]
    fn parameters_fields_variables_groups_extract() {
        let xml = wrap(
            r#"<parameter name="Title" class="java.lang.String" isForPrompting="true">
                 <defaultValueExpression><![CDATA["Report"]]></defaultValueExpression>
               </parameter>
               <field name="id" class="java.lang.Long"/>
               <variable name="total" class="java.math.BigDecimal" calculation="Sum">
                 <variableExpression><![CDATA[$F{amount}]]></variableExpression>
               </variable>
               <group name="region">
                 <groupExpression><![CDATA[$F{region}]]></groupExpression>
               </group>"#,
        );
        let report = parse(&xml).unwrap();
        assert_eq!(report.parameters.len(), 1);
        let p = &report.parameters[0];
        assert_eq!(p.name, "Title");
        assert!(p.is_for_prompting);
        assert_eq!(p.default_value_expression.as_deref(), Some(r#""Report""#));
        assert_eq!(report.fields[0].name, "id");
        assert_eq!(report.variables[0].calculation, "Sum");
        assert_eq!(report.variables[0].expression.as_deref(), Some("$F{amount}"));
        assert_eq!(report.groups[0].expression, "$F{region}");
    }

    #[test]
    fn variable_calculation_defaults_to_nothing() {
        let xml = wrap(r#"<variable name="v" class="java.lang.Integer"/>"#);
        let report = parse(&xml).unwrap();
        assert_eq!(report.variables[0].calculation, "Nothing");
        assert_eq!(report.variables[0].expression, None);
    }

    #[test]
    fn singleton_and_repeated_elements_both_normalize() {
        let one = wrap(
            r#"<title><band height="50">
                 <staticText><reportElement x="0" y="0" width="100" height="20"/><text>a</text></staticText>
               </band></title>"#,
        );
        let two = wrap(
            r#"<title><band height="50">
                 <staticText><reportElement x="0" y="0" width="100" height="20"/><text>a</text></staticText>
                 <staticText><reportElement x="0" y="20" width="100" height="20"/><text>b</text></staticText>
               </band></title>"#,
        );
        let r1 = parse(&one).unwrap();
        let r2 = parse(&two).unwrap();
        assert_eq!(r1.bands[0].elements.len(), 1);
        assert_eq!(r2.bands[0].elements.len(), 2);
        assert_eq!(r1.bands[0].elements[0].text.as_deref(), Some("a"));
        assert_eq!(r2.bands[0].elements[1].text.as_deref(), Some("b"));
    }

    #[test]
    fn bands_assemble_in_canonical_order() {
        // Declared out of order on purpose; detail carries two band instances.
        let xml = wrap(
            r#"<pageFooter><band height="30"/></pageFooter>
               <title><band height="60"/></title>
               <detail><band height="25"/><band height="35"/></detail>
               <group name="region">
                 <groupExpression><![CDATA[$F{region}]]></groupExpression>
                 <groupHeader><band height="18"/></groupHeader>
                 <groupFooter><band height="12"/></groupFooter>
               </group>"#,
        );
        let report = parse(&xml).unwrap();
        let order: Vec<&str> = report.bands.iter().map(|b| b.band_type.as_str()).collect();
        assert_eq!(
            order,
            vec![
                "title",
                "detail",
                "detail",
                "pageFooter",
                "groupHeader-region",
                "groupFooter-region"
            ]
        );
        assert_eq!(report.bands[1].height, 25);
        assert_eq!(report.bands[2].height, 35);
        assert_eq!(report.total_band_height(), 180);
    }

    #[test]
    fn band_container_may_be_the_band_itself() {
        // No nested <band> wrapper; the container carries the height.
        let xml = wrap(r#"<title height="40"/>"#);
        let report = parse(&xml).unwrap();
        assert_eq!(report.bands.len(), 1);
        assert_eq!(report.bands[0].band_type, "title");
        assert_eq!(report.bands[0].height, 40);
    }

    #[test]
    fn element_kinds_extract_with_type_specific_fields() {
        let xml = wrap(
            r##"<detail><band height="100">
                 <staticText>
                   <reportElement x="0" y="0" width="100" height="20" forecolor="#000000" mode="Opaque"/>
                   <textElement textAlignment="Center"><font fontName="Arial" size="12" isBold="true"/></textElement>
                   <text><![CDATA[Hello]]></text>
                 </staticText>
                 <textField pattern="#,##0.00">
                   <reportElement x="0" y="20" width="100" height="20"/>
                   <textFieldExpression><![CDATA[$F{amount}]]></textFieldExpression>
                 </textField>
                 <image><reportElement x="0" y="40" width="32" height="32"/></image>
                 <line><reportElement x="0" y="72" width="100" height="1"/></line>
                 <rectangle><reportElement x="0" y="73" width="100" height="10" backcolor="#CCCCCC" mode="Opaque"/></rectangle>
                 <subreport><reportElement x="0" y="83" width="100" height="10"/></subreport>
                 <chart chartType="pie"><reportElement x="0" y="93" width="100" height="7"/></chart>
               </band></detail>"##,
        );
        let report = parse(&xml).unwrap();
        let e = &report.bands[0].elements;
        assert_eq!(e.len(), 7);
        assert_eq!(e[0].kind, ElementKind::StaticText);
        assert_eq!(e[0].text.as_deref(), Some("Hello"));
        assert_eq!(e[0].font_name.as_deref(), Some("Arial"));
        assert_eq!(e[0].font_size, Some(12));
        assert_eq!(e[0].is_bold, Some(true));
        assert_eq!(e[0].text_alignment.as_deref(), Some("Center"));
        assert_eq!(e[1].kind, ElementKind::TextField);
        assert_eq!(e[1].expression.as_deref(), Some("$F{amount}"));
        assert_eq!(e[1].pattern.as_deref(), Some("#,##0.00"));
        assert_eq!(e[4].backcolor.as_deref(), Some("#CCCCCC"));
        assert_eq!(e[5].expression.as_deref(), Some("Subreport"));
        assert_eq!(e[6].expression.as_deref(), Some("pie"));
    }

    #[test]
    fn element_without_geometry_carrier_is_skipped() {
        let xml = wrap(
            r#"<detail><band height="20">
                 <staticText><text>orphan</text></staticText>
               </band></detail>"#,
        );
        let report = parse(&xml).unwrap();
        assert!(report.bands[0].elements.is_empty());
    }

    #[test]
    fn missing_typography_carrier_leaves_font_fields_unset() {
        let xml = wrap(
            r#"<detail><band height="20">
                 <staticText>
                   <reportElement x="5" y="5" width="50" height="10"/>
                   <text>plain</text>
                 </staticText>
               </band></detail>"#,
        );
        let report = parse(&xml).unwrap();
        let e = &report.bands[0].elements[0];
        assert_eq!(e.font_name, None);
        assert_eq!(e.font_size, None);
        assert_eq!(e.is_bold, None);
        assert_eq!(e.text_alignment, None);
    }

    #[test]
    fn font_without_size_defaults_to_ten() {
        let xml = wrap(
            r#"<detail><band height="20">
                 <staticText>
                   <reportElement x="0" y="0" width="50" height="10"/>
                   <textElement><font isBold="false"/></textElement>
                   <text>t</text>
                 </staticText>
               </band></detail>"#,
        );
        let report = parse(&xml).unwrap();
        let e = &report.bands[0].elements[0];
        assert_eq!(e.font_size, Some(10));
        assert_eq!(e.is_bold, Some(false));
    }

    #[test]
    fn declared_text_fields_do_not_leak_into_field_declarations() {
        let xml = wrap(
            r#"<detail><band height="20">
                 <textField>
                   <reportElement x="0" y="0" width="50" height="10"/>
                   <textFieldExpression><![CDATA[$F{x}]]></textFieldExpression>
                 </textField>
               </band></detail>"#,
        );
        let report = parse(&xml).unwrap();
        assert!(report.fields.is_empty());
        assert_eq!(report.bands[0].elements.len(), 1);
    }
}

//! End-to-end patching scenarios over the public API: locate, edit, splice,
//! re-parse.

use jrxml_preview::{apply_edit, locate_element_span, parse, ElementEdit, ElementKind, PatchError};

const INVOICE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<jasperReport name="invoice" pageWidth="595" pageHeight="842" columnWidth="555">
  <field name="name" class="java.lang.String"/>
  <title>
    <band height="50">
      <staticText>
        <reportElement x="0" y="10" width="200" height="30"/>
        <text><![CDATA[Invoice]]></text>
      </staticText>
    </band>
  </title>
  <detail>
    <band height="120">
      <textField>
        <reportElement x="50" y="100" width="200" height="20"/>
        <textFieldExpression><![CDATA[$F{name}]]></textFieldExpression>
      </textField>
    </band>
  </detail>
</jasperReport>"#;

fn edit(kind: ElementKind, x: i32, y: i32, width: i32, height: i32) -> ElementEdit {
    let mut e = ElementEdit::geometry(kind, x, y);
    e.width = width;
    e.height = height;
    e
}

#[test]
fn width_and_expression_edit_end_to_end() {
    let mut e = edit(ElementKind::TextField, 50, 100, 250, 20);
    e.expression = Some("$F{fullName}".to_string());
    let out = apply_edit(INVOICE, &e).unwrap();

    assert!(out.contains(r#"<reportElement x="50" y="100" width="250" height="20"/>"#));
    assert!(out.contains("<textFieldExpression><![CDATA[$F{fullName}]]></textFieldExpression>"));

    // Everything outside the text field's parent block is byte-identical.
    let span = locate_element_span(INVOICE, &ElementKind::TextField, 50, 100).unwrap();
    assert_eq!(&out[..span.start], &INVOICE[..span.start]);
    let tail = INVOICE.len() - span.end;
    assert_eq!(&out[out.len() - tail..], &INVOICE[span.end..]);

    // The refreshed model reflects the edit.
    let report = parse(&out).unwrap();
    let field = report
        .bands
        .iter()
        .flat_map(|b| &b.elements)
        .find(|e| e.kind == ElementKind::TextField)
        .unwrap();
    assert_eq!(field.width, 250);
    assert_eq!(field.expression.as_deref(), Some("$F{fullName}"));
}

#[test]
fn unknown_key_fails_and_input_is_unchanged() {
    let e = edit(ElementKind::StaticText, 123, 456, 10, 10);
    let err = apply_edit(INVOICE, &e).unwrap_err();
    assert!(matches!(
        err,
        PatchError::NotFound { x: 123, y: 456, ref kind } if *kind == ElementKind::StaticText
    ));
    // apply_edit borrows the input; failure means the caller's text stands.
    assert!(INVOICE.contains(r#"x="50" y="100""#));
}

#[test]
fn no_op_edit_is_rejected_not_reported_as_success() {
    let e = edit(ElementKind::StaticText, 0, 10, 200, 30);
    assert!(matches!(apply_edit(INVOICE, &e), Err(PatchError::NoChange)));
}

#[test]
fn ambiguous_key_patches_first_occurrence_only() {
    let doc = r#"<jasperReport name="dup">
  <title>
    <band height="60">
      <staticText>
        <reportElement x="10" y="10" width="80" height="20"/>
        <text><![CDATA[first]]></text>
      </staticText>
      <staticText>
        <reportElement x="10" y="10" width="80" height="20"/>
        <text><![CDATA[second]]></text>
      </staticText>
    </band>
  </title>
</jasperReport>"#;

    let mut e = edit(ElementKind::StaticText, 10, 10, 80, 20);
    e.text = Some("patched".to_string());
    let out = apply_edit(doc, &e).unwrap();

    // Deterministic tie-break: exactly the first element in document order.
    assert!(out.contains("<text><![CDATA[patched]]></text>"));
    assert!(out.contains("<text><![CDATA[second]]></text>"));
    assert!(!out.contains("first"));
    let report = parse(&out).unwrap();
    let texts: Vec<_> = report.bands[0]
        .elements
        .iter()
        .map(|e| e.text.as_deref().unwrap())
        .collect();
    assert_eq!(texts, vec!["patched", "second"]);
}

#[test]
fn patched_text_reparses_with_moved_geometry() {
    let mut e = edit(ElementKind::StaticText, 0, 10, 200, 30);
    e.x = 20;
    e.y = 15;
    let out = apply_edit(INVOICE, &e).unwrap();
    let report = parse(&out).unwrap();
    let title = &report.bands[0].elements[0];
    assert_eq!((title.x, title.y), (20, 15));

    // The new position is the key for the next edit round.
    assert!(locate_element_span(&out, &ElementKind::StaticText, 20, 15).is_some());
    assert!(locate_element_span(&out, &ElementKind::StaticText, 0, 10).is_none());
}

#[test]
fn surrounding_whitespace_and_declarations_survive_byte_for_byte() {
    let e = edit(ElementKind::TextField, 50, 100, 210, 20);
    let out = apply_edit(INVOICE, &e).unwrap();
    assert!(out.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(out.contains(r#"<field name="name" class="java.lang.String"/>"#));
    assert!(out.contains("  <title>\n    <band height=\"50\">"));
}

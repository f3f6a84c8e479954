use insta::assert_debug_snapshot;

use pq_common::settings::{DisambiguationBehavior, LexSettings, ParseSettings};
use pq_lexer::LexerSnapshot;
use pq_parser::error::{CsvContinuationKind, ParseError};
use pq_parser::{
    parse, try_lex_parse, NodeId, NodeKind, ParseFailure, ParseOk, TriedParse,
};

fn snapshot_of(text: &str) -> LexerSnapshot {
    LexerSnapshot::try_from_state(&pq_lexer::lex(&LexSettings::default(), text)).unwrap()
}

fn parse_text(text: &str) -> TriedParse {
    parse(&ParseSettings::default(), &snapshot_of(text))
}

fn parse_ok(text: &str) -> ParseOk {
    match parse_text(text) {
        Ok(ok) => ok,
        Err(failure) => panic!("expected {text:?} to parse, got {:?}", failure.error),
    }
}

fn parse_err(text: &str) -> Box<ParseFailure> {
    match parse_text(text) {
        Err(failure) => failure,
        Ok(_) => panic!("expected {text:?} to fail"),
    }
}

fn child_kinds(ok: &ParseOk, id: NodeId) -> Vec<NodeKind> {
    ok.node_id_map
        .iter_children(id)
        .map(|child| child.kind())
        .collect()
}

// ── Well-formed documents ───────────────────────────────────────────────

#[test]
fn literal_document() {
    let ok = parse_ok("42");
    let root = ok.node_id_map.ast_node(ok.root).unwrap();
    assert_eq!(root.kind, NodeKind::LiteralExpression);
    assert!(root.is_leaf);
    assert_eq!(root.attribute_index, None);
    ok.node_id_map.validate().unwrap();
}

#[test]
fn if_expression_children_sit_in_grammar_order() {
    let ok = parse_ok("if x then 1 else 2");
    let root = ok.node_id_map.ast_node(ok.root).unwrap();
    assert_eq!(root.kind, NodeKind::IfExpression);
    assert_debug_snapshot!(child_kinds(&ok, ok.root), @r"
    [
        Constant,
        IdentifierExpression,
        Constant,
        LiteralExpression,
        Constant,
        LiteralExpression,
    ]
    ");
    // Attribute indices are dense and increasing.
    let indices: Vec<Option<u32>> = ok
        .node_id_map
        .iter_children(ok.root)
        .map(|child| child.attribute_index())
        .collect();
    assert_eq!(
        indices,
        vec![Some(0), Some(1), Some(2), Some(3), Some(4), Some(5)]
    );
}

#[test]
fn single_operands_leave_no_wrapper_behind() {
    let ok = parse_ok("x");
    // The chain wrappers (logical, equality, …) and the recursive-primary
    // wrapper were all deleted on the way out.
    let root = ok.node_id_map.ast_node(ok.root).unwrap();
    assert_eq!(root.kind, NodeKind::IdentifierExpression);
    assert!(!ok
        .node_id_map
        .ast_node_by_id
        .values()
        .any(|node| matches!(
            node.kind,
            NodeKind::LogicalExpression
                | NodeKind::ArithmeticExpression
                | NodeKind::RecursivePrimaryExpression
        )));
}

#[test]
fn arithmetic_chain_is_flat() {
    let ok = parse_ok("1 + 2 * 3");
    let root = ok.node_id_map.ast_node(ok.root).unwrap();
    assert_eq!(root.kind, NodeKind::ArithmeticExpression);
    assert_debug_snapshot!(child_kinds(&ok, ok.root), @r"
    [
        LiteralExpression,
        Constant,
        LiteralExpression,
        Constant,
        LiteralExpression,
    ]
    ");
}

#[test]
fn let_expression_shape() {
    let ok = parse_ok("let x = 1, y = x in y");
    assert_debug_snapshot!(child_kinds(&ok, ok.root), @r"
    [
        Constant,
        ArrayWrapper,
        Constant,
        IdentifierExpression,
    ]
    ");
    let bindings = ok
        .node_id_map
        .child_by_attribute_index(ok.root, 1, Some(&[NodeKind::ArrayWrapper]))
        .unwrap();
    assert_eq!(ok.node_id_map.child_ids(bindings.id()).len(), 2);
    ok.node_id_map.validate().unwrap();
}

#[test]
fn invoke_expression_name_resolves() {
    let ok = parse_ok("Foo(1, 2)");
    let invoke = ok
        .node_id_map
        .ast_node_by_id
        .values()
        .find(|node| node.kind == NodeKind::InvokeExpression)
        .unwrap();
    assert_eq!(
        ok.node_id_map.invoke_expression_name(invoke.id),
        Some("Foo".to_string())
    );
}

#[test]
fn chained_invocations_only_name_the_first() {
    let ok = parse_ok("Foo(1)(2)");
    let mut invokes: Vec<NodeId> = ok
        .node_id_map
        .ast_node_by_id
        .values()
        .filter(|node| node.kind == NodeKind::InvokeExpression)
        .map(|node| node.id)
        .collect();
    invokes.sort();
    assert_eq!(invokes.len(), 2);
    let names: Vec<Option<String>> = invokes
        .iter()
        .map(|id| ok.node_id_map.invoke_expression_name(*id))
        .collect();
    assert_eq!(names, vec![Some("Foo".to_string()), None]);
}

#[test]
fn function_expression_with_parameters() {
    let ok = parse_ok("(a, b as number, optional d) => a");
    let root = ok.node_id_map.ast_node(ok.root).unwrap();
    assert_eq!(root.kind, NodeKind::FunctionExpression);
    let parameters: Vec<NodeId> = ok
        .node_id_map
        .ast_node_by_id
        .values()
        .filter(|node| node.kind == NodeKind::Parameter)
        .map(|node| node.id)
        .collect();
    assert_eq!(parameters.len(), 3);
}

#[test]
fn section_document() {
    let source = include_str!("../../../tests/fixtures/section.pq");
    let ok = parse_ok(source);
    let root = ok.node_id_map.ast_node(ok.root).unwrap();
    assert_eq!(root.kind, NodeKind::Section);
    let members: Vec<_> = ok
        .node_id_map
        .ast_node_by_id
        .values()
        .filter(|node| node.kind == NodeKind::SectionMember)
        .collect();
    assert_eq!(members.len(), 3);
    ok.node_id_map.validate().unwrap();
}

#[test]
fn expression_fixture_parses() {
    let source = include_str!("../../../tests/fixtures/expression.pq");
    let ok = parse_ok(source);
    assert_eq!(
        ok.node_id_map.ast_node(ok.root).unwrap().kind,
        NodeKind::LetExpression
    );
    ok.node_id_map.validate().unwrap();
}

#[test]
fn type_expressions() {
    let ok = parse_ok("type [A = number, B = nullable text]");
    assert_eq!(
        ok.node_id_map.ast_node(ok.root).unwrap().kind,
        NodeKind::TypePrimaryType
    );
    let ok = parse_ok("1 as number");
    assert_eq!(
        ok.node_id_map.ast_node(ok.root).unwrap().kind,
        NodeKind::AsExpression
    );
    let ok = parse_ok("x is nullable number");
    assert_eq!(
        ok.node_id_map.ast_node(ok.root).unwrap().kind,
        NodeKind::IsExpression
    );
}

/// A cast of a grouped expression has no `=>`, so the parens must not be
/// mistaken for a parameter list.
#[test]
fn parenthesized_cast_parses_as_an_as_expression() {
    for source in ["(1 + 1) as number", "(1) as nullable number"] {
        let ok = parse_ok(source);
        let root = ok.node_id_map.ast_node(ok.root).unwrap();
        assert_eq!(root.kind, NodeKind::AsExpression, "{source}");
        // The grouped expression survives as the chain's first operand.
        assert_eq!(
            ok.node_id_map
                .child_by_attribute_index(ok.root, 0, None)
                .unwrap()
                .kind(),
            NodeKind::ParenthesizedExpression,
            "{source}"
        );
        ok.node_id_map.validate().unwrap();
    }
}

#[test]
fn list_range_items() {
    let ok = parse_ok("{1..3, 5}");
    let ranges: Vec<_> = ok
        .node_id_map
        .ast_node_by_id
        .values()
        .filter(|node| node.kind == NodeKind::RangeExpression)
        .collect();
    assert_eq!(ranges.len(), 1);
}

// ── Round-trip law ──────────────────────────────────────────────────────

#[test]
fn root_spans_the_whole_document() {
    for source in ["1 + 2 * 3", "let x = 1 in x", "[a = 1, b = a]", "Foo(1)(2)"] {
        let ok = parse_ok(source);
        let root = ok.node_id_map.ast_node(ok.root).unwrap();
        assert_eq!(root.token_range.position_start.code_unit, 0, "{source}");
        assert_eq!(
            root.token_range.position_end.code_unit as usize,
            source.len(),
            "{source}"
        );
    }
}

#[test]
fn snapshot_text_round_trips_through_lexing() {
    let source = include_str!("../../../tests/fixtures/expression.pq");
    assert_eq!(snapshot_of(source).text(), source);
}

// ── Error tolerance ─────────────────────────────────────────────────────

#[test]
fn dangling_comma_keeps_the_invoke_inspectable() {
    let failure = parse_err("Foo(a,)");
    assert!(matches!(
        failure.error,
        ParseError::CsvContinuation {
            kind: CsvContinuationKind::DanglingComma,
            ..
        }
    ));

    let map = failure.node_id_map();
    map.validate().unwrap();
    // The invoke expression is an open context with a two-element argument
    // list: one closed Csv and one the error left open.
    let invoke = map
        .context_node_by_id
        .values()
        .find(|node| node.kind == NodeKind::InvokeExpression)
        .expect("invoke stays open");
    let wrapper = map
        .iter_children(invoke.id)
        .find(|child| child.kind() == NodeKind::ArrayWrapper)
        .expect("argument list exists");
    assert_eq!(map.child_ids(wrapper.id()).len(), 2);
}

#[test]
fn let_comma_before_in() {
    let failure = parse_err("let x = 1, in x");
    assert!(matches!(
        failure.error,
        ParseError::CsvContinuation {
            kind: CsvContinuationKind::LetExpression,
            ..
        }
    ));
}

#[test]
fn required_parameter_after_optional() {
    let failure = parse_err("(optional a, b) => 1");
    assert!(matches!(
        failure.error,
        ParseError::RequiredParameterAfterOptional { .. }
    ));
}

#[test]
fn unterminated_wrappers() {
    assert!(matches!(
        parse_err("(1").error,
        ParseError::UnterminatedParenthesis { .. }
    ));
    assert!(matches!(
        parse_err("[a = 1").error,
        ParseError::UnterminatedBracket { .. }
    ));
}

#[test]
fn unused_tokens_remain() {
    let failure = parse_err("1 2");
    assert!(matches!(
        failure.error,
        ParseError::UnusedTokensRemain { .. }
    ));
    // The literal itself still parsed; only the trailing token is loose.
    assert_eq!(failure.token_index, 1);
}

#[test]
fn invalid_primitive_type() {
    let failure = parse_err("1 as integer");
    assert!(matches!(
        failure.error,
        ParseError::InvalidPrimitiveType { .. }
    ));
}

#[test]
fn failed_parse_still_validates() {
    for source in ["Foo(a,)", "let x = in x", "if 1 then", "[a = , b = 2]"] {
        let failure = parse_err(source);
        failure.node_id_map().validate().unwrap();
    }
}

// ── Disambiguation ──────────────────────────────────────────────────────

#[test]
fn bracket_disambiguation_strict() {
    let ok = parse_ok("[x]");
    assert_eq!(
        ok.node_id_map.ast_node(ok.root).unwrap().kind,
        NodeKind::FieldSelector
    );
    let ok = parse_ok("[x = 1]");
    assert_eq!(
        ok.node_id_map.ast_node(ok.root).unwrap().kind,
        NodeKind::RecordExpression
    );
    let ok = parse_ok("[[x], [y]]");
    assert_eq!(
        ok.node_id_map.ast_node(ok.root).unwrap().kind,
        NodeKind::FieldProjection
    );
}

#[test]
fn bracket_disambiguation_thorough_agrees() {
    let settings = ParseSettings {
        disambiguation_behavior: DisambiguationBehavior::Thorough,
        ..ParseSettings::default()
    };
    for (source, expected) in [
        ("[x]", NodeKind::FieldSelector),
        ("[x = 1]", NodeKind::RecordExpression),
        ("[foo bar = 1]", NodeKind::RecordExpression),
    ] {
        let ok = parse(&settings, &snapshot_of(source)).unwrap();
        assert_eq!(
            ok.node_id_map.ast_node(ok.root).unwrap().kind,
            expected,
            "{source}"
        );
    }
}

#[test]
fn multi_token_record_keys_need_speculation() {
    // `foo bar` is one generalized identifier, which a single-token peek
    // cannot distinguish from a field selector.
    let ok = parse_ok("[foo bar = 1]");
    assert_eq!(
        ok.node_id_map.ast_node(ok.root).unwrap().kind,
        NodeKind::RecordExpression
    );
}

// ── Convenience entry point ─────────────────────────────────────────────

#[test]
fn try_lex_parse_bundles_the_pipeline() {
    let outcome = try_lex_parse(
        &LexSettings::default(),
        &ParseSettings::default(),
        "let x = 1 in x",
    )
    .unwrap();
    assert!(outcome.tried.is_ok());

    let lex_error = try_lex_parse(&LexSettings::default(), &ParseSettings::default(), "0x");
    assert!(lex_error.is_err());
}

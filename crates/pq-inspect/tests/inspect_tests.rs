use pq_common::keyword::{KeywordKind, EXPRESSION_KEYWORDS};
use pq_common::position::Position;
use pq_common::settings::{CommonSettings, LexSettings, ParseSettings};
use pq_inspect::{inspect, node_id_map, Inspected, ScopeItem};
use pq_parser::ast::PrimitiveTypeKind;
use pq_parser::{parse, NodeKind, TriedParse};

fn tried(text: &str) -> TriedParse {
    let snapshot =
        pq_lexer::LexerSnapshot::try_from_state(&pq_lexer::lex(&LexSettings::default(), text))
            .unwrap();
    parse(&ParseSettings::default(), &snapshot)
}

fn inspect_at(text: &str, line: u32, code_unit: u32) -> (Inspected, TriedParse) {
    let tried = tried(text);
    let inspected = inspect(
        &CommonSettings::default(),
        Position::new(line, code_unit),
        &tried,
    )
    .unwrap();
    (inspected, tried)
}

fn ancestry_kinds(inspected: &Inspected, tried: &TriedParse) -> Vec<NodeKind> {
    let map = node_id_map(tried);
    inspected
        .active_node
        .as_ref()
        .expect("an active node")
        .ancestry
        .iter()
        .map(|id| map.xor_node(*id).unwrap().kind())
        .collect()
}

// ── Ancestry ────────────────────────────────────────────────────────────

#[test]
fn ancestry_inside_a_record_key() {
    let (inspected, tried) = inspect_at("[foo = bar]", 0, 4);
    assert_eq!(
        ancestry_kinds(&inspected, &tried),
        vec![
            NodeKind::GeneralizedIdentifier,
            NodeKind::GeneralizedIdentifierPairedExpression,
            NodeKind::Csv,
            NodeKind::ArrayWrapper,
            NodeKind::RecordExpression,
        ]
    );
    // Typing the key itself must not bind it.
    assert!(inspected.scope.is_empty());
}

#[test]
fn ancestry_at_the_end_of_a_record_value() {
    let (inspected, tried) = inspect_at("[foo = bar]", 0, 10);
    let kinds = ancestry_kinds(&inspected, &tried);
    assert!(kinds.contains(&NodeKind::IdentifierExpression));
    assert!(inspected.scope.contains_key("bar"));
    assert!(inspected.scope.contains_key("foo"));
}

#[test]
fn ancestry_is_grounded_at_the_root() {
    let (inspected, tried) = inspect_at("let x = 1 in x", 0, 14);
    let map = node_id_map(&tried);
    let ancestry = &inspected.active_node.unwrap().ancestry;
    let last = *ancestry.last().unwrap();
    assert_eq!(map.parent_id(last), None);
}

// ── Invoke expressions ──────────────────────────────────────────────────

#[test]
fn invoke_expression_with_a_dangling_comma() {
    let (inspected, tried) = inspect_at("Foo(a,)", 0, 6);
    assert!(tried.is_err(), "the dangling comma is a parse error");

    let invoke = inspected.invoke_expression.expect("an enclosing invoke");
    assert_eq!(invoke.maybe_name.as_deref(), Some("Foo"));
    let arguments = invoke.maybe_arguments.expect("argument metadata");
    assert_eq!(arguments.num_arguments, 2);
    assert_eq!(arguments.argument_ordinal, 1);
}

#[test]
fn invoke_expression_ordinal_tracks_the_cursor() {
    let (inspected, _) = inspect_at("Foo(alpha, beta)", 0, 6);
    let arguments = inspected
        .invoke_expression
        .expect("an enclosing invoke")
        .maybe_arguments
        .unwrap();
    assert_eq!(arguments.num_arguments, 2);
    assert_eq!(arguments.argument_ordinal, 0);

    let (inspected, _) = inspect_at("Foo(alpha, beta)", 0, 13);
    assert_eq!(
        inspected
            .invoke_expression
            .unwrap()
            .maybe_arguments
            .unwrap()
            .argument_ordinal,
        1
    );
}

#[test]
fn no_invoke_expression_outside_calls() {
    let (inspected, _) = inspect_at("1 + 2", 0, 3);
    assert!(inspected.invoke_expression.is_none());
}

// ── Scope ───────────────────────────────────────────────────────────────

#[test]
fn function_parameters_carry_their_declarations() {
    let source = "(a, b as number, optional d) => 1";
    let (inspected, _) = inspect_at(source, 0, source.len() as u32);

    match inspected.scope.get("a") {
        Some(ScopeItem::Parameter {
            is_optional,
            is_nullable,
            maybe_type,
            ..
        }) => {
            assert!(!is_optional);
            assert!(is_nullable, "an untyped parameter accepts null");
            assert_eq!(*maybe_type, None);
        }
        other => panic!("expected a parameter for `a`, got {other:?}"),
    }
    match inspected.scope.get("b") {
        Some(ScopeItem::Parameter {
            is_optional,
            is_nullable,
            maybe_type,
            ..
        }) => {
            assert!(!is_optional);
            assert!(!is_nullable);
            assert_eq!(*maybe_type, Some(PrimitiveTypeKind::Number));
        }
        other => panic!("expected a parameter for `b`, got {other:?}"),
    }
    match inspected.scope.get("d") {
        Some(ScopeItem::Parameter {
            is_optional,
            is_nullable,
            maybe_type,
            ..
        }) => {
            assert!(is_optional);
            assert!(is_nullable);
            assert_eq!(*maybe_type, None);
        }
        other => panic!("expected a parameter for `d`, got {other:?}"),
    }
}

#[test]
fn each_binds_the_underscore() {
    let (inspected, _) = inspect_at("each 1 + 2", 0, 10);
    assert!(matches!(
        inspected.scope.get("_"),
        Some(ScopeItem::Each { .. })
    ));
}

#[test]
fn inner_record_keys_shadow_outer_ones() {
    let source = "[x = 1, y = [x = 2, z = 3]]";
    let (inspected, tried) = inspect_at(source, 0, 25);
    let map = node_id_map(&tried);

    // `x` resolves to the inner record's key, which starts at offset 13.
    match inspected.scope.get("x") {
        Some(ScopeItem::RecordKey { key_id }) => {
            let key = map.ast_node(*key_id).unwrap();
            assert_eq!(key.token_range.position_start.code_unit, 13);
        }
        other => panic!("expected a record key for `x`, got {other:?}"),
    }
    assert!(inspected.scope.contains_key("y"));
    assert!(inspected.scope.contains_key("z"));
}

#[test]
fn record_nodes_report_the_enclosing_record() {
    let (inspected, tried) = inspect_at("[a = 1, b = 2]", 0, 8);
    let map = node_id_map(&tried);
    assert!(inspected
        .scope_nodes
        .iter()
        .any(|id| map.xor_node(*id).unwrap().kind() == NodeKind::RecordExpression));

    // On the closing bracket the record no longer counts as enclosing.
    let (inspected, _) = inspect_at("[a = 1, b = 2]", 0, 13);
    assert!(inspected.scope_nodes.is_empty());
}

#[test]
fn section_members_are_in_scope() {
    let source = include_str!("../../../tests/fixtures/section.pq");
    let (inspected, _) = inspect_at(source, 7, 13);
    for name in ["Pi", "Double", "Half"] {
        assert!(
            matches!(
                inspected.scope.get(name),
                Some(ScopeItem::SectionMember { .. })
            ),
            "{name} should be a section member"
        );
    }
}

// ── Autocomplete ────────────────────────────────────────────────────────

#[test]
fn empty_document_offers_expression_keywords() {
    let (inspected, _) = inspect_at("", 0, 0);
    assert!(inspected.active_node.is_none());
    assert_eq!(
        inspected.autocomplete.allowed_autocomplete_keywords,
        EXPRESSION_KEYWORDS.to_vec()
    );
}

#[test]
fn let_body_offers_expression_keywords() {
    let (inspected, _) = inspect_at("let x = 1 in ", 0, 13);
    assert_eq!(
        inspected.autocomplete.maybe_required_autocomplete,
        None
    );
    assert_eq!(
        inspected.autocomplete.allowed_autocomplete_keywords,
        EXPRESSION_KEYWORDS.to_vec()
    );
}

#[test]
fn if_condition_requires_then() {
    let (inspected, _) = inspect_at("if 1 ", 0, 5);
    assert_eq!(
        inspected.autocomplete.maybe_required_autocomplete.as_deref(),
        Some("then")
    );
}

#[test]
fn if_consequent_requires_else() {
    let (inspected, _) = inspect_at("if 1 then 2 ", 0, 12);
    assert_eq!(
        inspected.autocomplete.maybe_required_autocomplete.as_deref(),
        Some("else")
    );
}

#[test]
fn completed_try_requires_otherwise() {
    let (inspected, _) = inspect_at("try 1 ", 0, 6);
    assert_eq!(
        inspected.autocomplete.maybe_required_autocomplete.as_deref(),
        Some("otherwise")
    );
    assert_eq!(
        inspected.autocomplete.allowed_autocomplete_keywords,
        vec![KeywordKind::Otherwise]
    );
}

#[test]
fn incomplete_try_offers_expression_keywords() {
    let (inspected, _) = inspect_at("try ", 0, 4);
    assert_eq!(inspected.autocomplete.maybe_required_autocomplete, None);
    assert_eq!(
        inspected.autocomplete.allowed_autocomplete_keywords,
        EXPRESSION_KEYWORDS.to_vec()
    );
}

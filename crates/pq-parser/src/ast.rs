//! The AST vocabulary.
//!
//! Nodes live in an arena keyed by [`NodeId`]; a node never holds a direct
//! reference to another node. Parent/child structure is recorded in the
//! side tables of [`crate::NodeIdMapCollection`], so an [`AstNode`] carries
//! only its kind, its token span, its slot under its parent, and -- for
//! leaves -- the literal payload.

use serde::Serialize;

use pq_common::position::TokenRange;

/// Identifies one node in the hybrid tree. AST nodes and still-open context
/// nodes draw from the same id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u32);

/// Every grammar production that can appear in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    ArithmeticExpression,
    ArrayWrapper,
    AsExpression,
    AsNullablePrimitiveType,
    Constant,
    Csv,
    EachExpression,
    EqualityExpression,
    ErrorHandlingExpression,
    ErrorRaisingExpression,
    FieldProjection,
    FieldSelector,
    FieldSpecification,
    FieldSpecificationList,
    FieldTypeSpecification,
    FunctionExpression,
    FunctionType,
    GeneralizedIdentifier,
    GeneralizedIdentifierPairedAnyLiteral,
    GeneralizedIdentifierPairedExpression,
    Identifier,
    IdentifierExpression,
    IdentifierPairedExpression,
    IfExpression,
    InvokeExpression,
    IsExpression,
    ItemAccessExpression,
    LetExpression,
    ListExpression,
    ListLiteral,
    ListType,
    LiteralExpression,
    LogicalExpression,
    MetadataExpression,
    NotImplementedExpression,
    NullablePrimitiveType,
    NullableType,
    OtherwiseExpression,
    Parameter,
    ParameterList,
    ParenthesizedExpression,
    PrimitiveType,
    RangeExpression,
    RecordExpression,
    RecordLiteral,
    RecordType,
    RecursivePrimaryExpression,
    RelationalExpression,
    Section,
    SectionMember,
    TableType,
    TypePrimaryType,
    UnaryExpression,
}

/// What flavor of literal a `LiteralExpression` holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LiteralKind {
    Logical,
    Null,
    Numeric,
    Text,
}

/// The primitive types of M.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrimitiveTypeKind {
    Action,
    Any,
    AnyNonNull,
    Binary,
    Date,
    DateTime,
    DateTimeZone,
    Duration,
    Function,
    List,
    Logical,
    None,
    Null,
    Number,
    Record,
    Table,
    Text,
    Time,
    Type,
}

impl PrimitiveTypeKind {
    /// Look up an identifier that names a primitive type.
    pub fn from_literal(text: &str) -> Option<Self> {
        let kind = match text {
            "action" => Self::Action,
            "any" => Self::Any,
            "anynonnull" => Self::AnyNonNull,
            "binary" => Self::Binary,
            "date" => Self::Date,
            "datetime" => Self::DateTime,
            "datetimezone" => Self::DateTimeZone,
            "duration" => Self::Duration,
            "function" => Self::Function,
            "list" => Self::List,
            "logical" => Self::Logical,
            "none" => Self::None,
            "null" => Self::Null,
            "number" => Self::Number,
            "record" => Self::Record,
            "table" => Self::Table,
            "text" => Self::Text,
            "time" => Self::Time,
            "type" => Self::Type,
            _ => return None,
        };
        Some(kind)
    }
}

/// Leaf payloads. Interior nodes carry [`NodeContents::None`]; their
/// children are reachable through the side tables only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NodeContents {
    None,
    /// A fixed piece of syntax: a keyword, an operator, or punctuation.
    Constant { literal: String },
    Identifier { literal: String },
    GeneralizedIdentifier { literal: String },
    Literal {
        literal: String,
        literal_kind: LiteralKind,
    },
    PrimitiveType { kind: PrimitiveTypeKind },
}

/// One completed node of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AstNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub token_range: TokenRange,
    pub is_leaf: bool,
    /// This node's slot in its parent's child order. `None` for the root.
    pub attribute_index: Option<u32>,
    pub contents: NodeContents,
}

impl AstNode {
    /// The literal text of an identifier-ish leaf, if this is one.
    pub fn literal(&self) -> Option<&str> {
        match &self.contents {
            NodeContents::Constant { literal }
            | NodeContents::Identifier { literal }
            | NodeContents::GeneralizedIdentifier { literal }
            | NodeContents::Literal { literal, .. } => Some(literal),
            NodeContents::None | NodeContents::PrimitiveType { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_type_lookup() {
        assert_eq!(
            PrimitiveTypeKind::from_literal("number"),
            Some(PrimitiveTypeKind::Number)
        );
        assert_eq!(
            PrimitiveTypeKind::from_literal("anynonnull"),
            Some(PrimitiveTypeKind::AnyNonNull)
        );
        assert_eq!(PrimitiveTypeKind::from_literal("integer"), None);
    }

    #[test]
    fn literal_accessor() {
        let node = AstNode {
            id: NodeId(1),
            kind: NodeKind::Identifier,
            token_range: pq_common::position::TokenRange {
                token_index_start: 0,
                token_index_end: 1,
                position_start: zero(),
                position_end: zero(),
            },
            is_leaf: true,
            attribute_index: None,
            contents: NodeContents::Identifier {
                literal: "x".into(),
            },
        };
        assert_eq!(node.literal(), Some("x"));
    }

    fn zero() -> pq_common::position::TokenPosition {
        pq_common::position::TokenPosition {
            line_number: 0,
            line_code_unit: 0,
            code_unit: 0,
        }
    }
}

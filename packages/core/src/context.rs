use oxc::ast::ast::{BinaryOperator, LogicalOperator};

/// The position a node occupies inside its parent, recorded while the rewriter descends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AncestorSlot {
  /// `test` of `test ? a : b`
  ConditionalTest,
  /// `a` or `b` of `test ? a : b`
  ConditionalBranch,
  /// Either operand of `==`, `===`, `!=`, `!==`, `<`, `>`, `<=`, `>=`
  Comparison(BinaryOperator),
  LogicalLeft(LogicalOperator),
  LogicalRight(LogicalOperator),
  CallArgument,
}

/// What a string literal is used for, judged from its ancestors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringContext {
  /// Used as a boolean guard: a ternary test or the left side of `&&`.
  Guarded,
  /// Compared against something, so it is a discriminant value.
  Discriminant,
  /// Nothing above it suggests it is anything other than rendered output.
  Eligible,
}

impl AncestorSlot {
  /// Slot for a child of a binary expression, `None` when the operator is not a comparison.
  pub fn for_binary_operator(operator: BinaryOperator) -> Option<Self> {
    match operator {
      BinaryOperator::Equality
      | BinaryOperator::StrictEquality
      | BinaryOperator::Inequality
      | BinaryOperator::StrictInequality
      | BinaryOperator::LessThan
      | BinaryOperator::GreaterThan
      | BinaryOperator::LessEqualThan
      | BinaryOperator::GreaterEqualThan => Some(AncestorSlot::Comparison(operator)),
      _ => None,
    }
  }

  fn disqualifies(self) -> Option<StringContext> {
    match self {
      AncestorSlot::ConditionalTest => Some(StringContext::Guarded),
      AncestorSlot::LogicalLeft(LogicalOperator::And) => Some(StringContext::Guarded),
      AncestorSlot::Comparison(_) => Some(StringContext::Discriminant),
      _ => None,
    }
  }
}

/// Walks the parent chain of a string literal, nearest ancestor first, and stops at
/// the first slot that makes the literal a guard or a discriminant.
/// Reaching the end of the chain (top of the file) means the literal is eligible.
pub fn classify_string_context<'s, I>(ancestors: I) -> StringContext
where
  I: IntoIterator<Item = &'s AncestorSlot>,
{
  ancestors
    .into_iter()
    .find_map(|slot| slot.disqualifies())
    .unwrap_or(StringContext::Eligible)
}

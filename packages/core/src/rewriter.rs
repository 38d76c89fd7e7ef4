use oxc::ast::ast::{
  Argument, BinaryExpression, CallExpression, ConditionalExpression, Expression, LogicalExpression,
  LogicalOperator, ObjectExpression, ObjectProperty, ObjectPropertyKind, PropertyKey,
  StringLiteral,
};
use oxc::ast::AstBuilder;
use oxc::ast_visit::{walk_mut, VisitMut};

use crate::class_list::prefix_classes;
use crate::context::{classify_string_context, AncestorSlot, StringContext};

/// Class name utilities whose arguments are class lists
const CLASS_LIST_CALLEES: [&str; 2] = ["cn", "cva"];

const CLASS_NAME_KEY: &str = "className";
const VARIANTS_KEY: &str = "variants";
/// Keys whose values hold variant names rather than class names
const VARIANT_SELECTION_KEYS: [&str; 2] = ["defaultVariants", "compoundVariants"];

/// Rewrites class lists in a program by prefixing every class token
///
/// Recognized shapes:
/// - `{ className: "..." }` object properties with a plain string value
/// - `cn(...)` calls, including objects, ternaries and `&&` / `||` / `??` chains in the arguments
/// - `cva(...)` calls, including the `variants` map of the configuration object
///
/// Anything else is walked only to find nested shapes; it is never rewritten.
pub struct ClassNamePrefixer<'a> {
  pub ast_builder: AstBuilder<'a>,
  pub prefix: String,
  /// Roles of the enclosing nodes, outermost first.
  /// Consulted before a `cn`/`cva` argument literal is prefixed.
  ancestors: Vec<AncestorSlot>,
  /// Number of string literals whose value was replaced
  pub prefixed_count: usize,
}

impl<'a> ClassNamePrefixer<'a> {
  pub fn new(ast_builder: AstBuilder<'a>, prefix: impl Into<String>) -> Self {
    Self {
      ast_builder,
      prefix: prefix.into(),
      ancestors: vec![],
      prefixed_count: 0,
    }
  }

  /// Replaces the literal's value with its prefixed class list
  /// Literals that would not change are left untouched, raw text included
  fn update_string_literal(&mut self, string_literal: &mut StringLiteral<'a>) {
    let updated_class_names = prefix_classes(&string_literal.value, &self.prefix);
    if updated_class_names == string_literal.value.as_str() {
      return;
    }

    string_literal.value = self.ast_builder.atom(&updated_class_names);
    // The printer would otherwise reuse the original source text
    string_literal.raw = None;
    self.prefixed_count += 1;
  }

  fn with_ancestor(&mut self, slot: AncestorSlot, f: impl FnOnce(&mut Self)) {
    self.ancestors.push(slot);
    f(self);
    self.ancestors.pop();
  }

  fn string_context(&self) -> StringContext {
    classify_string_context(self.ancestors.iter().rev())
  }

  /// Handles an expression sitting where a class list is expected
  /// (a `cn`/`cva` argument or a branch reached from one)
  fn update_class_value(&mut self, expression: &mut Expression<'a>) {
    match expression {
      Expression::StringLiteral(string_literal) => {
        if self.string_context() == StringContext::Eligible {
          self.update_string_literal(string_literal);
        }
      }
      Expression::ObjectExpression(object_expression) => {
        self.update_object_expression(object_expression, false);
      }
      Expression::ConditionalExpression(conditional_expression) => {
        self.update_conditional_expression(conditional_expression);
      }
      Expression::LogicalExpression(logical_expression) => {
        self.update_logical_expression(logical_expression);
      }
      Expression::ParenthesizedExpression(parenthesized) => {
        self.update_class_value(&mut parenthesized.expression);
      }
      _ => {
        // Identifiers, member access, nested calls: nothing is provably a class list,
        // but nested cn/cva calls and className properties still need a visit
        self.visit_expression(expression);
      }
    }
  }

  /// Ternaries: each branch is judged on its own, the test is never rewritten
  /// Example: isActive ? "bg-red-500" : variant -> only "bg-red-500" is prefixed
  fn update_conditional_expression(
    &mut self,
    conditional_expression: &mut ConditionalExpression<'a>,
  ) {
    self.with_ancestor(AncestorSlot::ConditionalTest, |this| {
      this.visit_expression(&mut conditional_expression.test);
    });
    self.with_ancestor(AncestorSlot::ConditionalBranch, |this| {
      this.update_class_value(&mut conditional_expression.consequent);
      this.update_class_value(&mut conditional_expression.alternate);
    });
  }

  /// For AND (&&) the left operand is a guard, only the right one is rendered
  /// For OR (||) and nullish coalescing (??) either operand may be rendered
  fn update_logical_expression(&mut self, logical_expression: &mut LogicalExpression<'a>) {
    let operator = logical_expression.operator;
    self.with_ancestor(AncestorSlot::LogicalLeft(operator), |this| {
      if operator == LogicalOperator::And {
        this.visit_expression(&mut logical_expression.left);
      } else {
        this.update_class_value(&mut logical_expression.left);
      }
    });
    self.with_ancestor(AncestorSlot::LogicalRight(operator), |this| {
      this.update_class_value(&mut logical_expression.right);
    });
  }

  /// Object literals in class positions
  ///
  /// `defaultVariants` and `compoundVariants` are skipped, their values are variant names.
  /// `variants: { ... }` switches the nested object into variant definition mode, where
  /// every property is a variant whose option map values are class lists:
  /// ```js
  /// variants: { size: { sm: "text-sm", lg: "text-lg" } }
  /// ```
  /// Keys are never rewritten at any level.
  fn update_object_expression(
    &mut self,
    object_expression: &mut ObjectExpression<'a>,
    is_variant_definition: bool,
  ) {
    for property_kind in object_expression.properties.iter_mut() {
      let ObjectPropertyKind::ObjectProperty(property) = property_kind else {
        continue;
      };
      let key = property_key_name(property);
      if key.is_some_and(|key| VARIANT_SELECTION_KEYS.contains(&key)) {
        continue;
      }
      let is_variants_key = key == Some(VARIANTS_KEY);

      if is_variant_definition {
        self.update_variant_options(&mut property.value);
        continue;
      }

      match &mut property.value {
        Expression::ObjectExpression(nested) if is_variants_key => {
          self.update_object_expression(nested, true);
        }
        Expression::StringLiteral(string_literal) => {
          self.update_string_literal(string_literal);
        }
        Expression::ObjectExpression(nested) => {
          self.update_object_expression(nested, false);
        }
        value => self.visit_expression(value),
      }
    }
  }

  /// Option map of a single variant, e.g. `{ sm: "text-sm", lg: "text-lg" }`
  fn update_variant_options(&mut self, options: &mut Expression<'a>) {
    match options {
      Expression::ObjectExpression(option_map) => {
        for property_kind in option_map.properties.iter_mut() {
          let ObjectPropertyKind::ObjectProperty(option) = property_kind else {
            continue;
          };
          match &mut option.value {
            Expression::StringLiteral(string_literal) => {
              self.update_string_literal(string_literal);
            }
            value => self.visit_expression(value),
          }
        }
      }
      _ => self.visit_expression(options),
    }
  }
}

/// Name of a non-computed identifier or string key
fn property_key_name<'k>(property: &'k ObjectProperty<'_>) -> Option<&'k str> {
  if property.computed {
    return None;
  }
  match &property.key {
    PropertyKey::StaticIdentifier(identifier) => Some(identifier.name.as_str()),
    PropertyKey::StringLiteral(string_literal) => Some(string_literal.value.as_str()),
    _ => None,
  }
}

/// Only bare identifiers count, `utils.cn(...)` is not recognized
fn is_class_list_call(call_expression: &CallExpression<'_>) -> bool {
  let Expression::Identifier(identifier) = &call_expression.callee else {
    return false;
  };
  CLASS_LIST_CALLEES
    .iter()
    .any(|callee| identifier.name == *callee)
}

impl<'a> VisitMut<'a> for ClassNamePrefixer<'a> {
  /// `cn(...)` and `cva(...)`: every argument is a class position
  /// Spread arguments are only walked
  fn visit_call_expression(&mut self, it: &mut CallExpression<'a>) {
    if !is_class_list_call(it) {
      walk_mut::walk_call_expression(self, it);
      return;
    }

    for argument in it.arguments.iter_mut() {
      if let Argument::SpreadElement(spread_element) = argument {
        self.visit_spread_element(spread_element);
        continue;
      }
      if let Some(expression) = argument.as_expression_mut() {
        self.with_ancestor(AncestorSlot::CallArgument, |this| {
          this.update_class_value(expression);
        });
      }
    }
  }

  /// `className: "..."` with a plain string value
  /// Template literals, conditionals and other expressions are left as they are
  fn visit_object_property(&mut self, it: &mut ObjectProperty<'a>) {
    let key = property_key_name(it);

    if key.is_some_and(|key| VARIANT_SELECTION_KEYS.contains(&key)) {
      return;
    }

    if matches!(&it.key, PropertyKey::StaticIdentifier(identifier) if identifier.name == CLASS_NAME_KEY)
      && !it.computed
    {
      if let Expression::StringLiteral(string_literal) = &mut it.value {
        self.update_string_literal(string_literal);
        return;
      }
    }

    walk_mut::walk_object_property(self, it);
  }

  fn visit_conditional_expression(&mut self, it: &mut ConditionalExpression<'a>) {
    self.with_ancestor(AncestorSlot::ConditionalTest, |this| {
      this.visit_expression(&mut it.test);
    });
    self.with_ancestor(AncestorSlot::ConditionalBranch, |this| {
      this.visit_expression(&mut it.consequent);
      this.visit_expression(&mut it.alternate);
    });
  }

  fn visit_logical_expression(&mut self, it: &mut LogicalExpression<'a>) {
    let operator = it.operator;
    self.with_ancestor(AncestorSlot::LogicalLeft(operator), |this| {
      this.visit_expression(&mut it.left);
    });
    self.with_ancestor(AncestorSlot::LogicalRight(operator), |this| {
      this.visit_expression(&mut it.right);
    });
  }

  fn visit_binary_expression(&mut self, it: &mut BinaryExpression<'a>) {
    match AncestorSlot::for_binary_operator(it.operator) {
      Some(slot) => self.with_ancestor(slot, |this| {
        this.visit_expression(&mut it.left);
        this.visit_expression(&mut it.right);
      }),
      None => walk_mut::walk_binary_expression(self, it),
    }
  }
}

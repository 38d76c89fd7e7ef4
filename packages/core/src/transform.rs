use std::path::PathBuf;
use std::time::Instant;

use oxc::ast::AstBuilder;
use oxc::codegen::{Codegen, CodegenOptions};
use oxc::{
  allocator::Allocator,
  ast_visit::VisitMut,
  parser::{Parser, ParserReturn},
  span::SourceType,
};
use serde::Deserialize;
use thiserror::Error;

use crate::filter::FileFilter;
use crate::rewriter::ClassNamePrefixer;
use crate::{log_error, log_info, log_warn};

/// Options supplied by the build tool, once per project
#[cfg_attr(feature = "napi", napi(object))]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrefixerOptions {
  /// Prepended verbatim to every class, separator included (e.g. "tw:")
  pub prefix: String,
  /// Globs or /regex/ patterns; empty means every script file
  pub include: Vec<String>,
  pub exclude: Vec<String>,
  /// Project root, stripped from module ids before include/exclude matching
  pub root: Option<String>,
}

impl PrefixerOptions {
  pub fn new(prefix: impl Into<String>) -> Self {
    Self {
      prefix: prefix.into(),
      ..Self::default()
    }
  }
}

#[cfg_attr(feature = "napi", napi(object))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
  pub code: String,
  pub sourcemap: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
  #[error("failed to parse {file_path}: {message}")]
  Parse { file_path: String, message: String },
  #[error("cannot determine the source type of {file_path}")]
  UnsupportedSourceType { file_path: String },
  #[error("invalid file pattern `{pattern}`: {message}")]
  InvalidPattern { pattern: String, message: String },
}

struct Rewritten {
  code: String,
  sourcemap: Option<String>,
  prefixed_count: usize,
}

/// Parses, prefixes and prints a single source file
/// Returns None when no literal was rewritten, so untouched files are never reprinted
fn rewrite(
  source_text: &str,
  source_type: SourceType,
  prefix: &str,
  sourcemap_path: Option<&str>,
) -> Result<Option<Rewritten>, TransformError> {
  let allocator = Allocator::default();

  let ParserReturn {
    mut program,
    errors,
    panicked,
    ..
  } = Parser::new(&allocator, source_text, source_type).parse();

  if panicked || !errors.is_empty() {
    let message = errors
      .iter()
      .map(|error| error.to_string())
      .collect::<Vec<String>>()
      .join("; ");
    return Err(TransformError::Parse {
      file_path: sourcemap_path.unwrap_or("<source>").to_string(),
      message,
    });
  }

  let mut prefixer = ClassNamePrefixer::new(AstBuilder::new(&allocator), prefix);
  prefixer.visit_program(&mut program);

  if prefixer.prefixed_count == 0 {
    return Ok(None);
  }

  let codegen = Codegen::new().with_options(CodegenOptions {
    source_map_path: sourcemap_path.map(PathBuf::from),
    ..CodegenOptions::default()
  });
  let result = codegen.build(&program);

  Ok(Some(Rewritten {
    code: result.code,
    sourcemap: result.map.map(|map| map.to_json_string()),
    prefixed_count: prefixer.prefixed_count,
  }))
}

/// Prefixes every recognized class list in a TSX source text
///
/// Text without any rewritable class list is returned exactly as given.
/// Example: `cn("flex", open && "block")` with "tw:" -> `cn("tw:flex", open && "tw:block")`
pub fn prefix_tailwind_classes(source_text: &str, prefix: &str) -> Result<String, TransformError> {
  Ok(
    rewrite(source_text, SourceType::tsx(), prefix, None)?
      .map(|rewritten| rewritten.code)
      .unwrap_or_else(|| source_text.to_string()),
  )
}

/// Per-project transform state: the prefix and the compiled include/exclude filter
///
/// Build tools create one per project and call [`Prefixer::transform`] for every module,
/// so patterns are compiled once instead of per file.
#[derive(Debug, Clone)]
pub struct Prefixer {
  prefix: String,
  filter: FileFilter,
}

impl Prefixer {
  pub fn new(options: &PrefixerOptions) -> Result<Self, TransformError> {
    let mut filter = FileFilter::new(&options.include, &options.exclude)?;
    if let Some(root) = &options.root {
      filter = filter.with_root(root);
    }
    Ok(Self {
      prefix: options.prefix.clone(),
      filter,
    })
  }

  /// Build tool entry point, called once per module
  ///
  /// Returns `Ok(None)` when the file should be left as it is on disk: it is filtered out,
  /// the prefix is empty, or the transform did not change anything.
  /// Parse failures abort this file only and carry no partial output.
  pub fn transform(
    &self,
    code: &str,
    file_path: &str,
  ) -> Result<Option<TransformOutput>, TransformError> {
    if !self.filter.is_eligible(file_path) {
      return Ok(None);
    }

    if self.prefix.is_empty() {
      log_warn!("Skipping {}: no class prefix configured", file_path);
      return Ok(None);
    }

    let time = Instant::now();
    let source_type =
      SourceType::from_path(file_path).map_err(|_| TransformError::UnsupportedSourceType {
        file_path: file_path.to_string(),
      })?;

    let rewritten = rewrite(code, source_type, &self.prefix, Some(file_path))
      .inspect_err(|err| log_error!("{}", err))?;

    let Some(rewritten) = rewritten else {
      return Ok(None);
    };
    if rewritten.code == code {
      return Ok(None);
    }

    log_info!(
      "Prefixed {} class lists in {} in {:?}",
      rewritten.prefixed_count,
      file_path,
      time.elapsed()
    );

    Ok(Some(TransformOutput {
      code: rewritten.code,
      sourcemap: rewritten.sourcemap,
    }))
  }
}

/// One-shot form of [`Prefixer::transform`] that compiles the options for this call only
pub fn transform(
  code: &str,
  file_path: &str,
  options: &PrefixerOptions,
) -> Result<Option<TransformOutput>, TransformError> {
  Prefixer::new(options)?.transform(code, file_path)
}

#[cfg(test)]
mod tests {
  use super::{prefix_tailwind_classes, transform, Prefixer, PrefixerOptions, TransformError};
  use crate::logger::get_logger;
  use pretty_assertions::assert_eq;

  const BUTTON: &str = r#"import { cva } from "class-variance-authority";
import { cn } from "@/lib/utils";

const buttonVariants = cva("inline-flex items-center [mask-type:luminance]", {
  variants: {
    variant: {
      default: "bg-primary text-primary-foreground",
      outline: "border border-input",
    },
    size: { sm: "h-8 px-3", lg: "h-10 px-8" },
  },
  compoundVariants: [{ variant: "outline", size: "lg", className: "border-2" }],
  defaultVariants: { variant: "default", size: "sm" },
});

export function Button({ className, variant, size, disabled, ...props }) {
  return (
    <button
      className={cn(
        buttonVariants({ variant, size }),
        variant === "outline" && "shadow-sm",
        disabled ? "opacity-50" : "--ring-offset",
        className,
      )}
      {...props}
    />
  );
}
"#;

  #[test]
  fn prefixes_class_name_property() {
    let output = prefix_tailwind_classes(r#"const a = { className: "bg-red-500" };"#, "foo:").unwrap();
    assert!(output.contains(r#"className: "foo:bg-red-500""#), "{output}");
  }

  #[test]
  fn prefixes_right_side_of_and_guard() {
    let output = prefix_tailwind_classes(r#"cn(isActive && "bg-red-500");"#, "foo:").unwrap();
    assert!(output.contains(r#""foo:bg-red-500""#), "{output}");
  }

  #[test]
  fn prefixes_both_ternary_branches() {
    let output = prefix_tailwind_classes(r#"cn(isActive ? "a" : "bg-red-500");"#, "foo:").unwrap();
    assert!(output.contains(r#""foo:a""#), "{output}");
    assert!(output.contains(r#""foo:bg-red-500""#), "{output}");
  }

  #[test]
  fn leaves_comparison_discriminants() {
    let output =
      prefix_tailwind_classes(r#"cn(variant === "primary" && "text-white");"#, "foo:").unwrap();
    assert!(output.contains(r#"variant === "primary""#), "{output}");
    assert!(output.contains(r#""foo:text-white""#), "{output}");
  }

  #[test]
  fn prefixes_cva_variant_values_but_not_keys() {
    let output = prefix_tailwind_classes(
      r#"cva("base", { variants: { size: { sm: "text-sm", lg: "text-lg" } } });"#,
      "foo:",
    )
    .unwrap();
    assert!(output.contains(r#""foo:base""#), "{output}");
    assert!(output.contains(r#"sm: "foo:text-sm""#), "{output}");
    assert!(output.contains(r#"lg: "foo:text-lg""#), "{output}");
    assert!(!output.contains("foo:size"), "{output}");
  }

  #[test]
  fn full_component() {
    let output = prefix_tailwind_classes(BUTTON, "tw:").unwrap();

    assert!(output.contains(r#"cva("tw:inline-flex tw:items-center [mask-type:luminance]""#));
    assert!(output.contains(r#"default: "tw:bg-primary tw:text-primary-foreground""#));
    assert!(output.contains(r#"outline: "tw:border tw:border-input""#));
    assert!(output.contains(r#""tw:h-8 tw:px-3""#));
    assert!(output.contains(r#""tw:h-10 tw:px-8""#));
    assert!(output.contains(r#"variant === "outline" && "tw:shadow-sm""#));
    assert!(output.contains(r#"disabled ? "tw:opacity-50" : "--ring-offset""#));
    // variant selections and compound variants are untouched
    assert!(output.contains(r#"className: "border-2""#));
    assert!(output.contains(r#"variant: "default""#));
    assert!(output.contains(r#"size: "sm""#));
    // module specifiers are not class lists
    assert!(output.contains(r#""class-variance-authority""#));
    assert!(output.contains(r#""@/lib/utils""#));
  }

  #[test]
  fn transform_is_idempotent() {
    let once = prefix_tailwind_classes(BUTTON, "tw:").unwrap();
    let twice = prefix_tailwind_classes(&once, "tw:").unwrap();
    assert_eq!(once, twice);
  }

  #[test]
  fn returns_input_verbatim_without_class_lists() {
    let source = "// helpers\nexport const  add = (a, b) =>   a + b;\nconsole.log('hi', add(1, 2));\n";
    assert_eq!(prefix_tailwind_classes(source, "foo:").unwrap(), source);
  }

  #[test]
  fn parse_failures_produce_no_output() {
    let err = prefix_tailwind_classes(r#"cn("flex""#, "foo:").unwrap_err();
    assert!(matches!(err, TransformError::Parse { .. }));
  }

  #[test]
  fn transform_returns_code_and_sourcemap() {
    let options = PrefixerOptions::new("tw:");
    let output = transform(BUTTON, "src/components/ui/button.tsx", &options)
      .unwrap()
      .unwrap();
    assert!(output.code.contains(r#""tw:shadow-sm""#));
    let sourcemap = output.sourcemap.unwrap();
    assert!(sourcemap.contains("button.tsx"), "{sourcemap}");
  }

  #[test]
  fn transform_skips_ineligible_files() {
    let options = PrefixerOptions {
      include: vec!["src/**".to_string()],
      exclude: vec!["**/*.stories.tsx".to_string()],
      ..PrefixerOptions::new("tw:")
    };
    assert_eq!(transform(BUTTON, "src/button.stories.tsx", &options), Ok(None));
    assert_eq!(transform(BUTTON, "lib/button.tsx", &options), Ok(None));
    assert_eq!(transform(BUTTON, "src/node_modules/x/button.tsx", &options), Ok(None));
    assert_eq!(transform(BUTTON, "src/button.css", &options), Ok(None));
    assert!(transform(BUTTON, "src/button.tsx", &options).unwrap().is_some());
  }

  #[test]
  fn prefixer_matches_absolute_module_ids() {
    let prefixer = Prefixer::new(&PrefixerOptions {
      include: vec!["src/**".to_string()],
      exclude: vec!["**/*.stories.tsx".to_string()],
      root: Some("/home/app".to_string()),
      ..PrefixerOptions::new("tw:")
    })
    .unwrap();

    let output = prefixer
      .transform(BUTTON, "/home/app/src/components/button.tsx")
      .unwrap()
      .unwrap();
    assert!(output.code.contains(r#""tw:shadow-sm""#));
    assert_eq!(prefixer.transform(BUTTON, "/home/app/src/button.stories.tsx"), Ok(None));
    assert_eq!(prefixer.transform(BUTTON, "/home/app/lib/button.tsx"), Ok(None));
  }

  #[test]
  fn transform_matches_absolute_paths_without_root() {
    let options = PrefixerOptions {
      include: vec!["src/**".to_string()],
      ..PrefixerOptions::new("tw:")
    };
    assert!(transform(BUTTON, "/home/app/src/button.tsx", &options)
      .unwrap()
      .is_some());
  }

  #[test]
  fn transform_reports_unchanged_files_as_none() {
    let options = PrefixerOptions::new("tw:");
    let source = r#"export const label = cn("tw:flex", className);"#;
    assert_eq!(transform(source, "src/label.ts", &options), Ok(None));
  }

  #[test]
  fn transform_skips_empty_prefix() {
    let options = PrefixerOptions::new("");
    assert_eq!(transform(BUTTON, "src/button.tsx", &options), Ok(None));
  }

  #[test]
  fn transform_parses_by_file_extension() {
    // Type assertions with angle brackets only parse as TypeScript, not TSX
    let source = r#"const size = <string>props.size; export const x = cn("flex", size);"#;
    let output = transform(source, "src/x.ts", &PrefixerOptions::new("tw:"))
      .unwrap()
      .unwrap();
    assert!(output.code.contains(r#""tw:flex""#));
  }

  #[test]
  fn transform_logs_parse_failures() {
    let err = transform("cn(", "src/broken-for-logging.tsx", &PrefixerOptions::new("tw:"))
      .unwrap_err();
    assert!(matches!(err, TransformError::Parse { ref file_path, .. } if file_path == "src/broken-for-logging.tsx"));
    // other tests share the global logger, so only look for this file's entry
    let logs = get_logger().drain_logs();
    assert!(logs
      .iter()
      .any(|entry| entry.level == "error" && entry.message.contains("broken-for-logging")));
  }

  #[test]
  fn options_deserialize_from_camel_case_json() {
    let options: PrefixerOptions =
      serde_json::from_str(r#"{ "prefix": "tw:", "exclude": ["**/legacy/**"] }"#).unwrap();
    assert_eq!(options.prefix, "tw:");
    assert!(options.include.is_empty());
    assert_eq!(options.exclude, vec!["**/legacy/**".to_string()]);
    assert_eq!(options.root, None);

    let options: PrefixerOptions =
      serde_json::from_str(r#"{ "prefix": "tw:", "root": "/home/app" }"#).unwrap();
    assert_eq!(options.root.as_deref(), Some("/home/app"));
  }
}

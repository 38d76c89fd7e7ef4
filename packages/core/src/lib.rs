#![deny(clippy::all)]

#[cfg(feature = "napi")]
#[macro_use]
extern crate napi_derive;

pub mod class_list;
pub mod context;
pub mod filter;
pub mod logger;
pub mod rewriter;
pub mod transform;

pub use class_list::prefix_classes;
pub use transform::{
  prefix_tailwind_classes, transform, Prefixer, PrefixerOptions, TransformError, TransformOutput,
};

#[cfg(feature = "napi")]
#[napi]
pub fn transform_code(
  code: String,
  file_path: String,
  options: PrefixerOptions,
) -> napi::Result<Option<TransformOutput>> {
  transform::transform(&code, &file_path, &options)
    .map_err(|err| napi::Error::from_reason(err.to_string()))
}

/// Keeps the compiled options alive across modules of one build
#[cfg(feature = "napi")]
#[napi(js_name = "Prefixer")]
pub struct JsPrefixer {
  inner: Prefixer,
}

#[cfg(feature = "napi")]
#[napi]
impl JsPrefixer {
  #[napi(constructor)]
  pub fn new(options: PrefixerOptions) -> napi::Result<Self> {
    let inner =
      Prefixer::new(&options).map_err(|err| napi::Error::from_reason(err.to_string()))?;
    Ok(Self { inner })
  }

  #[napi]
  pub fn transform(
    &self,
    code: String,
    file_path: String,
  ) -> napi::Result<Option<TransformOutput>> {
    self
      .inner
      .transform(&code, &file_path)
      .map_err(|err| napi::Error::from_reason(err.to_string()))
  }
}

/// Hands the collected log entries to the build tool and clears them
#[cfg(feature = "napi")]
#[napi]
pub fn drain_logs() -> Vec<logger::LogEntry> {
  logger::get_logger().drain_logs()
}

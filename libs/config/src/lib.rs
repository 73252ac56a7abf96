//! # objgraph Configuration
//!
//! Caller-side settings for applications that embed the codec. The codec
//! itself never reads files or the environment; this crate turns a TOML file
//! plus `OBJGRAPH__*` overrides into a configured
//! [`BinaryGraphCodec`](objgraph_codec::BinaryGraphCodec) and installs the
//! tracing subscriber.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use objgraph_config::{init_logging, CodecSettings};
//!
//! let settings = CodecSettings::load("config/objgraph.toml")?;
//! init_logging(&settings.logging)?;
//! let codec = settings.build_codec();
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## File Layout
//!
//! ```toml
//! [limits]
//! max_depth = 64
//! depth_cache_slots = 20
//!
//! [[renames.types]]
//! from = "Old.Ns.Foo"
//! to = "New.Ns.Foo"
//!
//! [[renames.assemblies]]
//! from = "legacy-models"
//! to = "models"
//!
//! [logging]
//! level = "objgraph_codec=debug,info"
//! json = false
//! ```

pub mod logging;
pub mod settings;

pub use logging::init_logging;
pub use settings::{CodecSettings, LimitSettings, LoggingSettings, RenameRule, RenameSettings};

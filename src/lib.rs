//! A markup template engine with control tags.
//!
//! Templates are markup documents where a few elements drive rendering:
//!
//! - `<include src="name">` splices another template in, binding its
//!   `<arg name>...</arg>` children to `{name}` placeholders of that template.
//! - `<if x>`, `<unless x>`, `<elseif x>`, `<elseunless x>` and `<else>`
//!   form chains where the first satisfied branch is kept. `<if x>` tests
//!   the truthiness of `x`, `<if x="value">` compares it with `value`.
//! - `<foreach val="item" key="i" in="list">` repeats its body for each
//!   entry of a sequence or mapping.
//! - `{variable}` placeholders, possibly dotted (`{user.name}`), are
//!   replaced by model values; unknown ones are left in place.
//!
//! Model keys are case-insensitive. Rendering never fails on malformed
//! templates: offending tags are dropped or left as they are and a
//! [Diagnostic] is reported according to the configured [Verbosity].
//!
//!
//! # Samples
//!
//! ## Hello world
//!
//! ```
//! use teddy::{Config, Engine, JsonValue, TemplateMap};
//!
//! let mut templates = TemplateMap::new();
//! templates.insert("hello.html", "<p>hello, {you}!</p>");
//! let data = r#"{
//!     "You": "world"
//! }"#;
//!
//! let engine = Engine::with_source(Config::default(), templates);
//! let context = serde_json::from_str::<JsonValue>(data).unwrap();
//!
//! let result = engine.render("hello.html", &context).unwrap();
//!
//! assert_eq!(result, "<p>hello, world!</p>")
//! ```
//!
//! ## Hello team
//!
//! ```
//! use teddy::{Config, Engine, TemplateMap, YamlValue};
//!
//! let mut templates = TemplateMap::new();
//! templates.insert("team.html", r#"
//!   <ul>
//!     <foreach val="member" in="team">
//!       <li><if member.lead>Lead </if>{member.name}</li>
//!     </foreach>
//!   </ul>
//! "#);
//! let data = r#"
//!   team:
//!     - name: john
//!       lead: true
//!     - name: 42
//! "#;
//!
//! let engine = Engine::with_source(Config::default(), templates);
//! let context = serde_yaml::from_str::<YamlValue>(data).unwrap();
//!
//! let result = engine.render("team.html", &context).unwrap();
//! assert_eq!(result, " <ul><li>Lead john</li><li>42</li></ul>");
//! ```
mod reader;
mod tree;
mod model;
mod json;
mod yaml;
mod vars;
mod condition;
mod include;
mod foreach;
mod render;
mod store;
mod template;
mod config;
mod diagnostic;
mod error;

pub use self::template::Engine;
pub use self::render::Rendered;
pub use self::model::{Model, IntoModel, flatten};
pub use self::json::JsonValue;
pub use self::yaml::YamlValue;
pub use self::store::{TemplateSource, FileSource, TemplateMap, TemplateCache, compile};
pub use self::config::{Config, Verbosity};
pub use self::diagnostic::Diagnostic;
pub use self::error::{Error, Result};

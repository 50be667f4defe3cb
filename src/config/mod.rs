// Configuration management module
// Handles TOML configuration loading, validation, and the setup wizard

pub mod interactive;
pub mod settings;


pub use interactive::{run_interactive_config, show_config};
pub use settings::{
    ChatConfig, CompletionConfig, Config, ConfigError, EmbeddingConfig, IndexBackend, IndexConfig,
    RetrievalConfig, config_dir, resolve_api_key,
};

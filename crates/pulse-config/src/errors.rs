#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse settings file '{path}': {message}")]
    SettingsParseError { path: String, message: String },

    #[error("Unknown setting '{key}'. Valid settings: {valid_keys}")]
    UnknownSetting { key: String, valid_keys: String },

    #[error("Invalid value '{value}' for setting '{key}': {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    #[error("Unknown view '{view}'. Valid views: {valid_views}")]
    UnknownView { view: String, valid_views: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Failed to serialize settings: {source}")]
    SerializeError {
        #[from]
        source: toml::ser::Error,
    },

    #[error("IO error accessing settings: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

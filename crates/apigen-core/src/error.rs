use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),
}

/// Fatal conditions hit while resolving schemas and operations.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),

    #[error("reference target not found: {0}")]
    RefTargetNotFound(String),

    #[error("circular alias chain at {location}: {chain}")]
    CircularAlias { location: String, chain: String },

    #[error("malformed schema at {location}: {reason}")]
    MalformedSchema { location: String, reason: String },

    #[error("no {target} type mapping for {schema_type}{} at {location}", format_suffix(.format))]
    UnmappedType {
        location: String,
        target: String,
        schema_type: String,
        format: Option<String>,
    },
}

fn format_suffix(format: &Option<String>) -> String {
    match format {
        Some(f) => format!(" (format `{f}`)"),
        None => String::new(),
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("invalid specFileLocation `{0}`: must be a relative path inside the output")]
    InvalidSpecFileLocation(String),
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

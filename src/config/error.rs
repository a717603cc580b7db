use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Couldn't access {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Couldn't serialize model")]
    Serialize(#[from] serde_yaml::Error),

    #[error("{} is in a read-only directory", .0.display())]
    ReadOnly(PathBuf),

    #[error("{field} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: u8,
        min: u8,
        max: u8,
    },

    #[error("{} can't be empty", .0)]
    Empty(&'static str),

    #[error("id={id} was used for multiple {kind}")]
    DuplicateId { kind: &'static str, id: u8 },

    #[error("name={name} was used for multiple {kind}")]
    DuplicateName { kind: &'static str, name: String },

    #[error("button_value_off and button_value_on are equal")]
    ButtonValuesEqual,

    #[error("knob_value_min must be smaller than knob_value_max")]
    KnobRange,
}

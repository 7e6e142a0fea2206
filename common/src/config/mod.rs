mod file;

pub use file::{
    expand_path, load_config, load_config_from, render_config, EstimateConfig, ImportConfig, ImporterConfig,
    SshConfig, CONFIG_PATHS,
};

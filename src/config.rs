use confique::Config as DeriveConfig;

#[derive(Debug, DeriveConfig)]
pub struct Config {
    /// Appended to the input path to name the dump file when no explicit path is given, e.g.
    /// `data.json` is dumped to `data.json.ser`.
    #[config(default = ".ser", env = "STJSON_DUMP_SUFFIX")]
    pub dump_suffix: String,

    /// How deeply arrays and objects may nest before a document is rejected.
    #[config(default = 512, env = "STJSON_MAX_DEPTH")]
    pub max_depth: usize,

    /// Would you like `dump` to load every dump it writes straight back and compare the result
    /// against the parsed tree? This catches a mismatched library version early.
    #[config(default = false, env = "STJSON_VERIFY_AFTER_DUMP")]
    pub verify_after_dump: bool,
}

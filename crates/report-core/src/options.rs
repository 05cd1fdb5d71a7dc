//! Options shared across the report pipeline.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::layout::{DEFAULT_TEXT_INPUTS, EXTENDED_TEXT_INPUTS};

/// Argument placeholder replaced by the filter's input file.
pub const INPUT_PLACEHOLDER: &str = "{input}";
/// Argument placeholder replaced by the merge tool's input files, one argument each.
pub const INPUTS_PLACEHOLDER: &str = "{inputs}";
/// Argument placeholder replaced by the output file.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// All options controlling a report run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    pub verbose: u8,

    /// External text→PDF filter.
    pub text_filter: ToolCommand,
    /// External multi-input PDF/image merge tool.
    pub merge_tool: ToolCommand,

    /// Text files converted first, in this order.
    pub text_inputs: Vec<String>,
    /// Also convert the analyzer's secondary text outputs when present.
    pub extended: bool,
    /// Extension (without dot) of the image files merged after the text pages.
    pub image_extension: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            verbose: 0,
            text_filter: ToolCommand::new("cupsfilter"),
            merge_tool: ToolCommand::new("convert"),
            text_inputs: DEFAULT_TEXT_INPUTS.iter().map(|s| s.to_string()).collect(),
            extended: false,
            image_extension: "svg".to_string(),
        }
    }
}

impl ReportOptions {
    /// Required text inputs. These are always handed to the filter, present or not.
    pub fn required_text_inputs(&self) -> impl Iterator<Item = &str> {
        self.text_inputs.iter().map(String::as_str)
    }

    /// Optional text inputs, converted only when they exist.
    pub fn optional_text_inputs(&self) -> &'static [&'static str] {
        if self.extended {
            EXTENDED_TEXT_INPUTS
        } else {
            &[]
        }
    }
}

/// How the filter delivers its rendered PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutput {
    /// The tool writes the PDF to standard output.
    Stdout,
    /// The tool writes the PDF to the path given as `{output}`.
    Argument,
}

/// An external program plus its argument template.
///
/// Placeholders are matched against whole arguments only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Arguments for rendering `input` into `output`.
    ///
    /// Without an `{output}` placeholder the caller redirects stdout into `output`.
    /// Without an `{input}` placeholder the input is appended.
    pub fn filter_args(&self, input: &Path, output: &Path) -> (Vec<OsString>, FilterOutput) {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        let mut saw_input = false;
        let mut mode = FilterOutput::Stdout;

        for arg in &self.args {
            match arg.as_str() {
                INPUT_PLACEHOLDER => {
                    saw_input = true;
                    args.push(input.as_os_str().to_owned());
                }
                OUTPUT_PLACEHOLDER => {
                    mode = FilterOutput::Argument;
                    args.push(output.as_os_str().to_owned());
                }
                _ => args.push(OsString::from(arg)),
            }
        }
        if !saw_input {
            args.push(input.as_os_str().to_owned());
        }

        (args, mode)
    }

    /// Arguments for merging `inputs` into `output`.
    ///
    /// Missing placeholders default to `<inputs..> <output>` appended at the end.
    pub fn merge_args(&self, inputs: &[PathBuf], output: &Path) -> Vec<OsString> {
        let mut args = Vec::with_capacity(self.args.len() + inputs.len() + 1);
        let mut saw_inputs = false;
        let mut saw_output = false;

        for arg in &self.args {
            match arg.as_str() {
                INPUTS_PLACEHOLDER => {
                    saw_inputs = true;
                    args.extend(inputs.iter().map(|p| p.as_os_str().to_owned()));
                }
                OUTPUT_PLACEHOLDER => {
                    saw_output = true;
                    args.push(output.as_os_str().to_owned());
                }
                _ => args.push(OsString::from(arg)),
            }
        }
        if !saw_inputs {
            args.extend(inputs.iter().map(|p| p.as_os_str().to_owned()));
        }
        if !saw_output {
            args.push(output.as_os_str().to_owned());
        }

        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(args: &[OsString]) -> Vec<&str> {
        args.iter().map(|a| a.to_str().unwrap()).collect()
    }

    #[test]
    fn test_defaults() {
        let opts = ReportOptions::default();
        assert_eq!(opts.text_filter.program, "cupsfilter");
        assert_eq!(opts.merge_tool.program, "convert");
        assert_eq!(
            opts.required_text_inputs().collect::<Vec<_>>(),
            vec!["fan_activity.txt", "stats_overall.txt"]
        );
        assert!(opts.optional_text_inputs().is_empty());
        assert_eq!(opts.image_extension, "svg");
    }

    #[test]
    fn test_extended_inputs() {
        let mut opts = ReportOptions::default();
        opts.extended = true;
        assert!(opts.optional_text_inputs().contains(&"posts_most_popular.txt"));
        assert!(opts.optional_text_inputs().contains(&"cross_active_people.txt"));
    }

    #[test]
    fn test_toml_partial_config() {
        let toml_str = r#"
verbose = 1
extended = true

[merge_tool]
program = "magick"
args = ["{inputs}", "-density", "150", "{output}"]
"#;
        let opts: ReportOptions = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.verbose, 1);
        assert!(opts.extended);
        assert_eq!(opts.merge_tool.program, "magick");
        assert_eq!(opts.merge_tool.args.len(), 4);
        // Defaults filled in
        assert_eq!(opts.text_filter, ToolCommand::new("cupsfilter"));
        assert_eq!(opts.text_inputs.len(), 2);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut opts = ReportOptions::default();
        opts.text_filter = ToolCommand::with_args("enscript", ["-B", "-p", "{output}"]);
        opts.image_extension = "png".to_string();

        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: ReportOptions = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.text_filter, opts.text_filter);
        assert_eq!(parsed.image_extension, "png");
    }

    #[test]
    fn test_filter_args_stdout_mode() {
        let tool = ToolCommand::new("cupsfilter");
        let (args, mode) = tool.filter_args(Path::new("d/a.txt"), Path::new("d/a.txt.pdf"));
        assert_eq!(strs(&args), vec!["d/a.txt"]);
        assert_eq!(mode, FilterOutput::Stdout);
    }

    #[test]
    fn test_filter_args_placeholders() {
        let tool = ToolCommand::with_args("enscript", ["-B", "-p", "{output}", "{input}"]);
        let (args, mode) = tool.filter_args(Path::new("a.txt"), Path::new("a.txt.pdf"));
        assert_eq!(strs(&args), vec!["-B", "-p", "a.txt.pdf", "a.txt"]);
        assert_eq!(mode, FilterOutput::Argument);
    }

    #[test]
    fn test_merge_args_default_order() {
        let tool = ToolCommand::new("convert");
        let inputs = vec![PathBuf::from("a.txt.pdf"), PathBuf::from("x.svg")];
        let args = tool.merge_args(&inputs, Path::new("report-d.pdf"));
        assert_eq!(strs(&args), vec!["a.txt.pdf", "x.svg", "report-d.pdf"]);
    }

    #[test]
    fn test_merge_args_placeholders() {
        let tool = ToolCommand::with_args("magick", ["-density", "150", "{inputs}", "{output}"]);
        let inputs = vec![PathBuf::from("a.pdf"), PathBuf::from("b.svg")];
        let args = tool.merge_args(&inputs, Path::new("out.pdf"));
        assert_eq!(
            strs(&args),
            vec!["-density", "150", "a.pdf", "b.svg", "out.pdf"]
        );
    }

    #[test]
    fn test_placeholder_must_be_whole_argument() {
        let tool = ToolCommand::with_args("tool", ["--out={output}"]);
        let args = tool.merge_args(&[], Path::new("o.pdf"));
        assert_eq!(strs(&args), vec!["--out={output}", "o.pdf"]);
    }
}

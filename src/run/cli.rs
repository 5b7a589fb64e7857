use crate::output::WriterOptions;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use derive_builder::Builder;
use std::fmt::{Display, Formatter};

macro_rules! create_options_structs {
    (
        $(
            $(#[$meta:meta])*
            clap $clap:tt
            pub $name:ident : $ty:ty
        ),* $(,)?
    ) => {
        #[derive(Clone, Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Parser)]
        #[command(version, about, long_about = None)]
        #[doc(hidden)]
        pub struct CliOptions {
            $(
            $(#[$meta])*
            #[arg$clap]
            pub(crate) $name: $ty,
            )*

            // clap-only stuff:

            /// The selector string.
            ///
            /// If not given, Markdown input selects everything in the compiled document's body, and HTML input selects
            /// the whole document.
            #[arg(value_name = "selector")]
            pub(crate) selector: Option<String>,

            /// Files to read, by path. If not provided, standard input will be used.
            ///
            /// The files are concatenated, in order, before being parsed. A path of "-" represents standard input; all
            /// but the first "-" are ignored.
            #[arg()]
            pub(crate) file_paths: Vec<String>,
        }

        /// Options analogous to the markq CLI's switches.
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Builder)]
        #[builder(default)]
        pub struct RunOptions {
            $(
            $(#[$meta])*
            pub $name: $ty,
            )*

            /// The selector; `None` selects the input's default target.
            pub selector: Option<String>,

            pub file_paths: Vec<String>,
        }

        impl From<CliOptions> for RunOptions {
            fn from(value: CliOptions) -> Self {
                Self {
                    $($name: value.$name,)*
                    selector: value.selector,
                    file_paths: value.file_paths,
                }
            }
        }
    };
}

create_options_structs! {
    /// The format of the input.
    clap(long, value_enum, default_value_t = InputFormat::Markdown)
    pub from: InputFormat,

    /// Specifies the output format. Defaults to html.
    clap(long, short, value_enum, default_value_t = OutputFormat::Html)
    pub output: OutputFormat,

    /// Write tags and text without adding any line breaks or indentation.
    clap(long)
    pub no_reformat: bool,

    /// Write text content as-is, without entity-encoding it.
    clap(long, conflicts_with = "safe")
    pub no_entities: bool,

    /// Tags to remove, along with everything inside them. Comma-separated.
    clap(long, value_delimiter = ',', value_name = "TAGS")
    pub strip: Vec<String>,

    /// The only tags to write; other elements are replaced by their contents. Comma-separated.
    clap(long, value_delimiter = ',', value_name = "TAGS")
    pub allow: Option<Vec<String>>,

    /// One level of indentation when reformatting.
    clap(long, default_value = "  ")
    pub indent: String,

    /// Write void elements in their self-closed form (`<br />`).
    clap(long)
    pub xhtml: bool,

    /// Render for untrusted display: strip scripts and other active content, allow only formatting tags, and keep only
    /// safe link and image attributes. --strip and --allow add to and replace the preset's lists.
    clap(long)
    pub safe: bool,

    /// Fail instead of matching literally when the selector uses the `~=` or `|=` attribute modifiers.
    clap(long)
    pub strict: bool,

    /// Quiet: do not print anything to stdout. The exit code will still be 0 if anything matches, and non-0 if not.
    clap(long, short)
    pub quiet: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            from: InputFormat::Markdown,
            output: OutputFormat::Html,
            no_reformat: false,
            no_entities: false,
            strip: vec![],
            allow: None,
            indent: "  ".to_string(),
            xhtml: false,
            safe: false,
            strict: false,
            quiet: false,
            selector: None,
            file_paths: vec![],
        }
    }
}

impl From<&RunOptions> for WriterOptions {
    fn from(cli: &RunOptions) -> Self {
        let mut options = if cli.safe {
            WriterOptions::safe()
        } else {
            WriterOptions::default()
        };
        options.reformat = !cli.no_reformat;
        if cli.no_entities {
            options.encode_entities = false;
        }
        options.strip_tags.extend(cli.strip.iter().map(|tag| tag.trim().to_ascii_lowercase()));
        if let Some(allow) = &cli.allow {
            options.allowed_tags = Some(allow.iter().map(|tag| tag.trim().to_ascii_lowercase()).collect());
        }
        options.indent = cli.indent.clone();
        options.xhtml = cli.xhtml;
        options
    }
}

impl CliOptions {
    pub fn extra_validation(&self) -> bool {
        if !self.indent.chars().all(char::is_whitespace) {
            let _ = CliOptions::command()
                .error(ErrorKind::InvalidValue, "--indent can only contain whitespace")
                .print();
            return false;
        }
        true
    }
}

/// Input formats, analogous to `--from` in the CLI.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum InputFormat {
    /// Markdown, compiled into an HTML document.
    #[default]
    Markdown,

    /// HTML, parsed the way a browser would.
    Html,
}

/// Output formats, analogous to `--output` in the CLI.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum OutputFormat {
    /// Render the selected nodes as HTML.
    #[default]
    Html,

    /// Output the selected nodes as a JSON array of element and text trees.
    Json,
}

impl Display for InputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            InputFormat::Markdown => "markdown",
            InputFormat::Html => "html",
        })
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::utils_for_test::*;
    use clap::Error;
    use std::collections::BTreeSet;

    #[test]
    fn verify_cli() {
        CliOptions::command().debug_assert();
    }

    #[test]
    fn no_args() {
        let result = CliOptions::try_parse_from(["markq"]);
        unwrap!(result, Ok(cli));
        assert!(cli.file_paths.is_empty());
        let run_opts: RunOptions = cli.into();
        assert_eq!(run_opts.selector, None);
    }

    #[test]
    fn no_args_equals_default() {
        let result = CliOptions::try_parse_from(["markq"]);
        unwrap!(result, Ok(cli));
        let from_cli: RunOptions = cli.into();
        assert_eq!(from_cli, RunOptions::default());
    }

    #[test]
    fn selector_and_files() {
        let result = CliOptions::try_parse_from(["markq", "ul li", "a.md", "-"]);
        unwrap!(result, Ok(cli));
        let run_opts: RunOptions = cli.into();
        assert_eq!(run_opts.selector.as_deref(), Some("ul li"));
        assert_eq!(run_opts.file_paths, ["a.md", "-"]);
    }

    #[test]
    fn comma_separated_tags() {
        let result = CliOptions::try_parse_from(["markq", "--strip", "script,style", "--allow=p,B"]);
        unwrap!(result, Ok(cli));
        let run_opts: RunOptions = cli.into();
        assert_eq!(run_opts.strip, ["script", "style"]);

        let writer = WriterOptions::from(&run_opts);
        assert_eq!(writer.strip_tags, BTreeSet::from(["script".to_string(), "style".to_string()]));
        assert_eq!(writer.allowed_tags, Some(BTreeSet::from(["p".to_string(), "b".to_string()])));
    }

    #[test]
    fn safe_writer_options() {
        let run_opts = RunOptionsBuilder::default()
            .safe(true)
            .strip(vec!["table".to_string()])
            .build()
            .unwrap();
        let writer = WriterOptions::from(&run_opts);
        assert!(writer.is_sanitizing());
        assert!(writer.strip_tags.contains("script"));
        assert!(writer.strip_tags.contains("table"));
    }

    #[test]
    fn safe_conflicts_with_no_entities() {
        let result = CliOptions::try_parse_from(["markq", "--safe", "--no-entities"]);
        check_err(&result, "the argument '--safe' cannot be used with '--no-entities'");
    }

    #[test]
    fn bad_input_format() {
        let result = CliOptions::try_parse_from(["markq", "--from", "rtf"]);
        unwrap!(result, Err(_));
    }

    #[test]
    fn indent_validation() {
        let result = CliOptions::try_parse_from(["markq", "--indent", "\t"]);
        unwrap!(result, Ok(cli));
        assert!(cli.extra_validation());
    }

    fn check_err(result: &Result<CliOptions, Error>, expect: &str) {
        unwrap!(result, Err(e));
        let e_str = e.to_string();
        let first_line = e_str.split('\n').next().expect("no error string found");
        let mut expect_full = "error: ".to_string();
        expect_full.push_str(expect);
        assert_eq!(first_line, &expect_full);
    }
}

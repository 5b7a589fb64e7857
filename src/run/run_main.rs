use crate::dom::{Document, ParseOptions};
use crate::md;
use crate::output::{SerializableNodes, WriterOptions};
use crate::query::Selector;
use crate::run::cli::{InputFormat, OutputFormat};
use crate::run::RunOptions;
use crate::select::Elements;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::{env, io};

/// The run's overall possible error.
#[derive(Debug)]
pub enum Error {
    /// Parsing, compiling, selecting or rendering failed.
    ///
    /// This wraps the library's own [`crate::Error`].
    Engine(crate::Error),

    /// Couldn't read an input file.
    FileReadError(Input, io::Error),

    /// Couldn't write the output.
    WriteError(io::Error),
}

impl std::error::Error for Error {}

impl From<crate::Error> for Error {
    fn from(value: crate::Error) -> Self {
        Error::Engine(value)
    }
}

/// Stdin or an input file by path.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Input {
    Stdin,
    FilePath(String),
}

impl Error {
    pub(crate) fn from_io_error(error: io::Error, file: Input) -> Self {
        Error::FileReadError(file, error)
    }
}

impl Display for Input {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Input::Stdin => f.write_str("stdin"),
            Input::FilePath(file) => write!(f, "file {file:?}"),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Engine(err) => writeln!(f, "{err}"),
            Error::FileReadError(file, err) => {
                let portable = !env::var("MARKQ_PORTABLE_ERRORS").unwrap_or_default().is_empty();
                write_read_error(f, file, err, portable)
            }
            Error::WriteError(err) => writeln!(f, "{err} while writing output"),
        }
    }
}

/// With `portable`, only the error's kind is written, so the message doesn't depend on the OS.
fn write_read_error(f: &mut Formatter<'_>, file: &Input, err: &io::Error, portable: bool) -> std::fmt::Result {
    if portable {
        writeln!(f, "{} while reading {file}", err.kind())
    } else {
        writeln!(f, "{err} while reading {file}")
    }
}

/// A simple facade for handling I/O.
///
/// This trait lets you do "I/O-y stuff" like mocking out stdin or reading files. The [`run`] method uses it.
pub trait OsFacade {
    /// Read stdin (or your mock of it) to a `String`.
    fn read_stdin(&self) -> io::Result<String>;

    /// Read a file path (or your mock of one) to a `String`.
    fn read_file(&self, path: &str) -> io::Result<String>;

    /// Get a writer for stdout (or your mock of it).
    fn stdout(&mut self) -> impl Write;

    /// Handle an error.
    fn write_error(&mut self, err: Error);

    /// Read a slice of file paths into a single, concatenated `String`.
    ///
    /// The default implementation (which you should feel free to use) treats the file path `"-"` as stdin. The first
    /// `"-"` reads all of stdin (via [`Self::read_stdin`]), and subsequent `"-"`s get silently ignored.
    fn read_all(&self, file_paths: &[String]) -> Result<String, Error> {
        if file_paths.is_empty() {
            return self.read_stdin().map_err(|err| Error::from_io_error(err, Input::Stdin));
        }
        let mut contents = String::new();
        let mut have_read_stdin = false;
        for path in file_paths {
            if path == "-" {
                if !have_read_stdin {
                    contents.push_str(
                        &self
                            .read_stdin()
                            .map_err(|err| Error::from_io_error(err, Input::Stdin))?,
                    );
                    have_read_stdin = true
                }
            } else {
                let path_contents = self
                    .read_file(path)
                    .map_err(|err| Error::from_io_error(err, Input::FilePath(path.to_string())))?;
                contents.push_str(&path_contents);
            }
            contents.push('\n');
        }
        Ok(contents)
    }
}

/// Runs markq end to end.
///
/// This reads the input through the [`OsFacade`], builds a [`Document`] from it according to the `from` option,
/// selects from it with [`RunOptions::selector`], and writes the selection in the format given by
/// [`RunOptions::output`]. Returns whether anything was selected.
pub fn run(cli: &RunOptions, os: &mut impl OsFacade) -> bool {
    match run_or_error(cli, os) {
        Ok(ok) => ok,
        Err(err) => {
            os.write_error(err);
            false
        }
    }
}

fn run_or_error(cli: &RunOptions, os: &mut impl OsFacade) -> Result<bool, Error> {
    let contents = os.read_all(&cli.file_paths)?;
    let (doc, default_target) = match cli.from {
        InputFormat::Markdown => {
            let doc = md::compile(&contents)?;
            let body = doc.body().children(true)?;
            (doc, body)
        }
        InputFormat::Html => {
            let doc = Document::parse_html(&contents, &ParseOptions::default())?;
            let root = doc.root();
            (doc, root)
        }
    };

    let selected = match &cli.selector {
        None => default_target,
        Some(selector_str) => select(&doc, selector_str, cli.strict)?,
    };
    tracing::debug!("selected {} node(s)", selected.len());

    let found_any = !selected.is_empty();

    if !cli.quiet {
        let mut stdout = os.stdout();
        match cli.output {
            OutputFormat::Html => {
                let rendered = selected.render(&WriterOptions::from(cli))?;
                stdout.write_all(rendered.as_bytes()).map_err(Error::WriteError)?;
            }
            OutputFormat::Json => {
                let nodes = SerializableNodes::new(&selected)?;
                serde_json::to_writer(&mut stdout, &nodes).map_err(|err| Error::WriteError(err.into()))?;
                stdout.write_all(b"\n").map_err(Error::WriteError)?;
            }
        }
    }

    Ok(found_any)
}

fn select(doc: &Document, selector_str: &str, strict: bool) -> Result<Elements, Error> {
    let selector = Selector::parse(selector_str);
    if strict {
        selector.ensure_supported()?;
    }
    Ok(doc.root().select_parsed(&selector)?)
}

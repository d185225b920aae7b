//! Splits raw arguments into option and file tokens, then sorts the option
//! tokens into frontend, backend and engine buckets.

use crate::error::{Error, Result};

use super::ESCAPE_TOKEN;

/// Which consumer an option-like token is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionTarget {
    Frontend,
    Backend,
    Engine,
}

impl OptionTarget {
    /// Classify an option-like token by its first non-dash character.
    ///
    /// Returns `None` when the token is made up of dashes only.
    pub fn of(token: &str) -> Option<Self> {
        match token.chars().find(|&c| c != '-')? {
            'f' => Some(OptionTarget::Frontend),
            'b' => Some(OptionTarget::Backend),
            _ => Some(OptionTarget::Engine),
        }
    }
}

/// Order-preserving view of a raw argument vector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedArguments {
    option_arguments: Vec<String>,
    frontend_options: Vec<String>,
    backend_options: Vec<String>,
    engine_options: Vec<String>,
    file_arguments: Vec<String>,
}

impl ClassifiedArguments {
    pub fn partition<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let mut classified = Self::default();

        let boundary = args
            .iter()
            .position(|arg| arg.as_ref() == ESCAPE_TOKEN)
            .unwrap_or(args.len());
        let (head, tail) = args.split_at(boundary);

        for arg in head {
            let arg = arg.as_ref();
            if arg.starts_with('-') {
                classified.option_arguments.push(arg.to_string());
            } else {
                classified.file_arguments.push(arg.to_string());
            }
        }
        // skip the escape token itself
        classified
            .file_arguments
            .extend(tail.iter().skip(1).map(|arg| arg.as_ref().to_string()));

        for arg in &classified.option_arguments {
            let bucket = match OptionTarget::of(arg).ok_or_else(|| Error::invalid_argument(arg))? {
                OptionTarget::Frontend => &mut classified.frontend_options,
                OptionTarget::Backend => &mut classified.backend_options,
                OptionTarget::Engine => &mut classified.engine_options,
            };
            bucket.push(arg.clone());
        }

        Ok(classified)
    }

    /// Every option-like token before the escape boundary
    pub fn option_arguments(&self) -> &[String] {
        &self.option_arguments
    }

    pub fn frontend_options(&self) -> &[String] {
        &self.frontend_options
    }

    pub fn backend_options(&self) -> &[String] {
        &self.backend_options
    }

    pub fn engine_options(&self) -> &[String] {
        &self.engine_options
    }

    pub fn file_arguments(&self) -> &[String] {
        &self.file_arguments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments() {
        let args: [&str; 0] = [];
        let classified = ClassifiedArguments::partition(&args).unwrap();
        assert!(classified.option_arguments().is_empty());
        assert!(classified.frontend_options().is_empty());
        assert!(classified.backend_options().is_empty());
        assert!(classified.engine_options().is_empty());
        assert!(classified.file_arguments().is_empty());
    }

    #[test]
    fn test_escaped_files() {
        let args = [
            "-an-argument",
            "--another-argument",
            "--",
            "a_file",
            "-anotherfile.txt",
        ];
        let classified = ClassifiedArguments::partition(&args).unwrap();

        assert_eq!(
            classified.option_arguments(),
            ["-an-argument", "--another-argument"]
        );
        assert_eq!(classified.file_arguments(), ["a_file", "-anotherfile.txt"]);
    }

    #[test]
    fn test_only_first_escape_counts() {
        let args = ["--", "--", "-b"];
        let classified = ClassifiedArguments::partition(&args).unwrap();
        assert!(classified.option_arguments().is_empty());
        assert_eq!(classified.file_arguments(), ["--", "-b"]);
    }

    #[test]
    fn test_dash_only_token_after_escape_is_a_file() {
        let args = ["--", "----"];
        let classified = ClassifiedArguments::partition(&args).unwrap();
        assert_eq!(classified.file_arguments(), ["----"]);
    }

    #[test]
    fn test_mixed_options_and_files() {
        let args = ["-an-argument", "a_file", "-another-argument"];
        let classified = ClassifiedArguments::partition(&args).unwrap();

        assert_eq!(
            classified.option_arguments(),
            ["-an-argument", "-another-argument"]
        );
        assert_eq!(classified.file_arguments(), ["a_file"]);
    }

    #[test]
    fn test_option_separation() {
        let args = ["--engine-one", "--frontend-two", "--backend-three"];
        let classified = ClassifiedArguments::partition(&args).unwrap();

        assert_eq!(classified.option_arguments().len(), 3);
        assert_eq!(classified.engine_options(), ["--engine-one"]);
        assert_eq!(classified.frontend_options(), ["--frontend-two"]);
        assert_eq!(classified.backend_options(), ["--backend-three"]);
    }

    #[test]
    fn test_discriminator_ignores_length_and_dashes() {
        assert_eq!(OptionTarget::of("-f"), Some(OptionTarget::Frontend));
        assert_eq!(OptionTarget::of("---foo"), Some(OptionTarget::Frontend));
        assert_eq!(OptionTarget::of("-bar"), Some(OptionTarget::Backend));
        assert_eq!(OptionTarget::of("--verbose"), Some(OptionTarget::Engine));
        assert_eq!(OptionTarget::of("-F"), Some(OptionTarget::Engine));
        assert_eq!(OptionTarget::of("---"), None);
    }

    #[test]
    fn test_malformed_many_dashes() {
        let args = ["--arg-one", "----", "arg_two"];
        match ClassifiedArguments::partition(&args) {
            Err(Error::InvalidArgument { token }) => assert_eq!(token, "----"),
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn test_single_dash_is_malformed() {
        let args = ["-"];
        assert!(matches!(
            ClassifiedArguments::partition(&args),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_every_token_lands_in_exactly_one_bucket() {
        let args = ["-fa", "x", "--bb", "-e", "y", "--", "-fz", "z", "--"];
        let classified = ClassifiedArguments::partition(&args).unwrap();
        let total = classified.frontend_options().len()
            + classified.backend_options().len()
            + classified.engine_options().len()
            + classified.file_arguments().len();
        assert_eq!(total, args.len() - 1);
        assert_eq!(classified.file_arguments(), ["x", "y", "-fz", "z", "--"]);
    }
}

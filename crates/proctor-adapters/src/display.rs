//! Human-readable command lines for check reports.
//!
//! These strings are only ever printed. Programs are always launched with
//! discrete argv elements.

use std::borrow::Cow;

/// Join `name` and `args` the way a shell user would type them, quoting any
/// argument that contains whitespace or shell metacharacters.
///
/// # Example
///
/// ```rust
/// use proctor_adapters::display::command_line;
///
/// assert_eq!(command_line("java", ["-cp", ".", "Main", "two words"]), "java -cp . Main 'two words'");
/// ```
pub fn command_line<I, S>(name: &str, args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut line = String::from(name);
    for arg in args {
        line.push(' ');
        line.push_str(&quote(arg.as_ref()));
    }
    line
}

/// Quote a single word for display, leaving plain words untouched.
#[must_use]
pub fn quote(word: &str) -> Cow<'_, str> {
    shell_words::quote(word)
}

/// `echo '<text>' | <command>`, showing piped text input.
#[must_use]
pub fn piped_from_echo(text: &str, command: &str) -> String {
    format!("echo {} | {command}", single_quoted(text))
}

/// `<command> < <file>`, showing redirected file input.
#[must_use]
pub fn redirected_from(command: &str, file: &str) -> String {
    format!("{command} < {}", quote(file))
}

/// `<command> > <file>`, showing captured output.
#[must_use]
pub fn redirected_to(command: &str, file: &str) -> String {
    format!("{command} > {}", quote(file))
}

fn single_quoted(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_arguments_are_not_quoted() {
        assert_eq!(
            command_line("javac", ["-d", "classes", "Main.java"]),
            "javac -d classes Main.java"
        );
    }

    #[test]
    fn test_arguments_with_spaces_are_quoted() {
        assert_eq!(
            command_line("python3", ["hello.py", "Hello World"]),
            "python3 hello.py 'Hello World'"
        );
    }

    #[test]
    fn test_no_arguments() {
        assert_eq!(command_line::<_, &str>("ant", []), "ant");
    }

    #[test]
    fn test_echo_always_single_quotes() {
        assert_eq!(
            piped_from_echo("hello", "python3 upper.py"),
            "echo 'hello' | python3 upper.py"
        );
        assert_eq!(
            piped_from_echo("it's", "python3 upper.py"),
            r"echo 'it'\''s' | python3 upper.py"
        );
    }

    #[test]
    fn test_redirections() {
        assert_eq!(
            redirected_from("python3 sum.py", "data/numbers.txt"),
            "python3 sum.py < data/numbers.txt"
        );
        assert_eq!(
            redirected_to("python3 sum.py", "out file.txt"),
            "python3 sum.py > 'out file.txt'"
        );
    }
}

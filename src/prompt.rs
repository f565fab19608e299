use std::io::{self, BufRead, Write};

/// Ask `question` on `output` and read one line from `input`.
/// An empty answer or EOF yields `default`.
pub fn prompt_with_default<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
    default: &str,
) -> io::Result<String> {
    write!(output, "{} [{}]: ", question, default)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    let answer = line.trim();
    if answer.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(answer.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ask(input: &str) -> (String, String) {
        let mut input = Cursor::new(input.as_bytes().to_vec());
        let mut output = Vec::new();
        let answer =
            prompt_with_default(&mut input, &mut output, "Enter ESP32 IP address", "192.168.11.144")
                .unwrap();
        (answer, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_prompt_text() {
        let (_, shown) = ask("\n");
        assert_eq!(shown, "Enter ESP32 IP address [192.168.11.144]: ");
    }

    #[test]
    fn test_empty_answer_uses_default() {
        assert_eq!(ask("\n").0, "192.168.11.144");
        assert_eq!(ask("   \r\n").0, "192.168.11.144");
    }

    #[test]
    fn test_eof_uses_default() {
        assert_eq!(ask("").0, "192.168.11.144");
    }

    #[test]
    fn test_answer_is_trimmed() {
        assert_eq!(ask("  10.0.0.7 \n").0, "10.0.0.7");
    }
}

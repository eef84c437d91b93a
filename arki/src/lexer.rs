/*
Copyright 2026 Ian Moffett

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use crate::errors::AssemblyError;
use crate::state::Assembler;
use crate::token::Token;

fn is_ws(c: u8) -> bool {
    matches!(c, b' ' | b'\r' | b'\t' | b'\x0c')
}

impl Assembler<'_> {
    fn getc(&mut self) -> Option<u8> {
        let c = *self.src.get(self.pos)?;
        self.pos += 1;
        Some(c)
    }

    fn put_back(&mut self, c: u8) {
        self.putback = Some(c);
    }

    /// Consume one byte of input, honoring the putback slot. A non-
    /// whitespace character in the slot is always returned; a whitespace
    /// character only when the caller did not ask for skipping.
    fn consume(&mut self, skip_ws: bool) -> Option<u8> {
        if let Some(c) = self.putback.take() {
            if !is_ws(c) || !skip_ws {
                return Some(c);
            }
        }

        while let Some(c) = self.getc() {
            if skip_ws && is_ws(c) {
                continue;
            }
            return Some(c);
        }

        None
    }

    /// Consume the rest of the current line, including the terminating
    /// newline.
    fn skip_line(&mut self) {
        while let Some(c) = self.getc() {
            if c == b'\n' {
                break;
            }
        }
    }

    /// Scan an identifier starting at `first`. A ':' terminator turns it
    /// into a label (colon consumed); any other terminator goes back
    /// into the putback slot.
    fn scan_ident(&mut self, first: u8) -> Token {
        let mut name = String::new();
        name.push(first as char);

        let mut terminator = None;
        loop {
            match self.consume(false) {
                Some(c) if c.is_ascii_alphanumeric() || c == b'_' => {
                    name.push(c as char);
                }
                Some(c) => {
                    terminator = Some(c);
                    break;
                }
                None => break,
            }
        }

        if terminator == Some(b':') {
            return Token::Label(name);
        }
        if let Some(c) = terminator {
            self.put_back(c);
        }

        Token::keyword(&name).unwrap_or(Token::Ident(name))
    }

    /// Scan a number starting at `first`. A "0x" prefix selects base 16;
    /// '_' separators are skipped; overflow truncates silently.
    fn scan_number(&mut self, first: u8) -> Token {
        let mut base = 10;
        let mut value: i64 = 0;

        if first == b'0' {
            match self.consume(false) {
                Some(b'x') => base = 16,
                Some(c) => self.put_back(c),
                None => {}
            }
        } else {
            value = i64::from(first - b'0');
        }

        loop {
            let Some(c) = self.consume(false) else { break };
            if c == b'_' {
                continue;
            }
            let Some(digit) = (c as char).to_digit(base) else {
                self.put_back(c);
                break;
            };
            value = value
                .wrapping_mul(i64::from(base))
                .wrapping_add(i64::from(digit));
        }

        Token::Number(value)
    }

    /// Scan the next token from the input stream. Returns `None` at end
    /// of input.
    pub(crate) fn scan(&mut self) -> Result<Option<Token>, AssemblyError> {
        let Some(c) = self.consume(true) else {
            return Ok(None);
        };

        let tok = match c {
            b',' => Token::Comma,
            b'\n' => {
                self.line_num += 1;
                Token::Newline
            }
            b';' => {
                self.skip_line();
                Token::Comment
            }
            c if c.is_ascii_alphabetic() || c == b'_' || c == b'.' => self.scan_ident(c),
            c if c.is_ascii_digit() => self.scan_number(c),
            c => {
                return Err(AssemblyError::UnexpectedChar {
                    line: self.line_num,
                    ch: c as char,
                });
            }
        };

        Ok(Some(tok))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reg::Reg;

    fn tokens(src: &str) -> Vec<Token> {
        let mut state = Assembler::new(src.as_bytes());
        let mut toks = Vec::new();
        while let Some(tok) = state.scan().unwrap() {
            toks.push(tok);
        }
        toks
    }

    #[test]
    fn scans_a_statement() {
        assert_eq!(
            tokens("mov g0, 0x10\n"),
            vec![
                Token::Mov,
                Token::Reg(Reg::G0),
                Token::Comma,
                Token::Number(0x10),
                Token::Newline,
            ]
        );
    }

    #[test]
    fn whitespace_is_insignificant() {
        assert_eq!(tokens("mov\tg0 ,  1\n"), tokens("mov g0, 1\n"));
    }

    #[test]
    fn labels_consume_the_colon() {
        assert_eq!(
            tokens("loop:\nhlt\n"),
            vec![
                Token::Label("loop".to_string()),
                Token::Newline,
                Token::Hlt,
                Token::Newline,
            ]
        );
    }

    #[test]
    fn comments_run_to_end_of_line() {
        assert_eq!(
            tokens("hlt ; stop here\nsrr"),
            vec![Token::Hlt, Token::Comment, Token::Srr]
        );
    }

    #[test]
    fn register_names_reclassify() {
        assert_eq!(tokens("a7"), vec![Token::Reg(Reg::A7)]);
        assert_eq!(tokens("g3"), vec![Token::Reg(Reg::G3)]);
    }

    #[test]
    fn near_register_names_stay_identifiers() {
        assert_eq!(tokens("g"), vec![Token::Ident("g".to_string())]);
        assert_eq!(tokens("g9"), vec![Token::Ident("g9".to_string())]);
        assert_eq!(tokens("a7x"), vec![Token::Ident("a7x".to_string())]);
    }

    #[test]
    fn decimal_and_hex_agree() {
        assert_eq!(tokens("123"), vec![Token::Number(123)]);
        assert_eq!(tokens("0x7B"), vec![Token::Number(123)]);
        assert_eq!(tokens("0x7b"), vec![Token::Number(123)]);
        assert_eq!(tokens("1_2_3"), vec![Token::Number(123)]);
        assert_eq!(tokens("0"), vec![Token::Number(0)]);
    }

    #[test]
    fn number_terminator_is_preserved() {
        assert_eq!(
            tokens(".byte 1, 2\n"),
            vec![
                Token::Byte,
                Token::Number(1),
                Token::Comma,
                Token::Number(2),
                Token::Newline,
            ]
        );
    }

    #[test]
    fn newline_bumps_line_number() {
        let mut state = Assembler::new(b"hlt\nhlt\n");
        while state.scan().unwrap().is_some() {}
        assert_eq!(state.line_num, 3);
    }

    #[test]
    fn unexpected_character_fails() {
        let mut state = Assembler::new(b"@");
        assert_eq!(
            state.scan(),
            Err(AssemblyError::UnexpectedChar { line: 1, ch: '@' })
        );
    }

    // Concatenating the printable forms (whitespace aside) reconstructs
    // the input.
    #[test]
    fn token_stream_reconstructs_input() {
        for src in ["mov g0, 123\n", "start:\nldq a0, g7\n", ".byte 1, 2, 3\n"] {
            let rendered: String = tokens(src).iter().map(|t| t.to_string()).collect();
            let strip = |s: &str| s.replace([' ', '\t'], "");
            assert_eq!(strip(&rendered), strip(src));
        }
    }
}

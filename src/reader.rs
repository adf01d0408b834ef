#[derive(Clone)]
pub(crate) struct Reader<'a> {
    input: &'a str,
    pos: usize,
    raw_text: Option<&'a str>
}

impl<'a> Reader<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Reader {
            input,
            pos: 0,
            raw_text: None
        }
    }

    pub(crate) fn pop_front(&mut self) -> Option<Token<'a>> {
        if self.pos == self.input.len() {
            None
        } else {
            let tail = &self.input[self.pos..];
            let token = match self.raw_text.take() {
                Some(name) => match tail.span_raw_text(name) {
                    0 => self.read_markup(tail),
                    after_text => {
                        self.pos += after_text;
                        Token::Text(&tail[..after_text])
                    }
                },
                None if tail.starts_with('<') => self.read_markup(tail),
                None => self.read_text(tail, 0)
            };
            Some(token)
        }
    }

    // anything after `skip` up to the next `<` is text
    fn read_text(&mut self, tail: &'a str, skip: usize) -> Token<'a> {
        let after_text = tail[skip..].find('<').map_or(tail.len(), |p| p + skip);
        self.pos += after_text;
        Token::Text(&tail[..after_text])
    }

    fn read_markup(&mut self, tail: &'a str) -> Token<'a> {
        let spanned = if tail.starts_with("<!--") {
            tail.span_comment().map(
                |after| (Token::Comment(&tail[..after]), after)
            )
        } else if tail.starts_with("<!") || tail.starts_with("<?") {
            tail.find('>').map(
                |p| (Token::Declaration(&tail[..p + 1]), p + 1)
            )
        } else if tail.starts_with("</") {
            tail.span_end_tag().map(
                |(name, after)| (Token::Close(name), after)
            )
        } else {
            tail.span_start_tag().map(
                |(name, attributes, self_closing, after)| {
                    (Token::Open(name, attributes, self_closing), after)
                }
            )
        };
        match spanned {
            Some((token, after)) => {
                if let Token::Open(name, _, false) = &token {
                    if is_raw_text(name) {
                        self.raw_text = Some(*name);
                    }
                }
                self.pos += after;
                token
            },
            // not markup after all, the `<` is plain text
            None => self.read_text(tail, 1)
        }
    }
}


#[derive(PartialEq, Debug, Clone)]
pub(crate) struct Attribute<'a> {
    pub(crate) name: &'a str,
    pub(crate) value: Option<&'a str>,
    pub(crate) quote: Option<char>
}


#[derive(PartialEq, Debug)]
pub(crate) enum Token<'a> {
    Text(&'a str),
    Open(&'a str, Vec<Attribute<'a>>, bool),
    Close(&'a str),
    Comment(&'a str),
    Declaration(&'a str)
}


fn is_raw_text(name: &str) -> bool {
    name.eq_ignore_ascii_case("script") || name.eq_ignore_ascii_case("style")
}


trait ReaderStringOps {
    fn span_raw_text(&self, name: &str) -> usize;
    fn span_comment(&self) -> Option<usize>;
    fn span_end_tag(&self) -> Option<(&str, usize)>;
    fn span_start_tag(&self) -> Option<(&str, Vec<Attribute<'_>>, bool, usize)>;
    fn span_attribute(&self) -> Option<(Attribute<'_>, usize)>;
    fn span_name(&self) -> usize;
    fn span_whitespace(&self) -> usize;
}

impl ReaderStringOps for str {
    // return the position of the end tag closing a raw text element
    // return the length of the string if there is none
    fn span_raw_text(&self, name: &str) -> usize {
        let mut from = 0;
        while let Some(p) = self[from..].find("</") {
            let start = from + p + 2;
            let candidate = self.get(start..start + name.len());
            if candidate.map_or(false, |it| it.eq_ignore_ascii_case(name)) {
                return from + p;
            }
            from = start;
        }
        self.len()
    }

    fn span_comment(&self) -> Option<usize> {
        self[4..].find("-->").map(|p| 4 + p + 3)
    }

    // return the end tag name and the position after the tag
    fn span_end_tag(&self) -> Option<(&str, usize)> {
        if !self.as_bytes().get(2).map_or(false, u8::is_ascii_alphabetic) {
            return None;
        }
        let after_name = 2 + self[2..].span_name();
        let close = self[after_name..].find('>')?;
        Some((&self[2..after_name], after_name + close + 1))
    }

    // return the tag name, its attributes, whether it closes itself and the position after the tag
    // return None if the string does not start with a well-formed start tag
    fn span_start_tag(&self) -> Option<(&str, Vec<Attribute<'_>>, bool, usize)> {
        let bytes = self.as_bytes();
        if !bytes.get(1).map_or(false, u8::is_ascii_alphabetic) {
            return None;
        }
        let mut pos = 1 + self[1..].span_name();
        let name = &self[1..pos];
        let mut attributes = Vec::new();
        loop {
            pos += self[pos..].span_whitespace();
            match bytes.get(pos)? {
                b'>' => return Some((name, attributes, false, pos + 1)),
                b'/' if bytes.get(pos + 1) == Some(&b'>') => {
                    return Some((name, attributes, true, pos + 2))
                },
                b'/' => pos += 1,
                _ => {
                    let (attribute, after) = self[pos..].span_attribute()?;
                    attributes.push(attribute);
                    pos += after;
                }
            }
        }
    }

    fn span_attribute(&self) -> Option<(Attribute<'_>, usize)> {
        let after_name = self.span_name();
        if after_name == 0 {
            return None;
        }
        let name = &self[..after_name];
        let mut pos = after_name + self[after_name..].span_whitespace();
        if !self[pos..].starts_with('=') {
            return Some((Attribute { name, value: None, quote: None }, after_name));
        }
        pos += 1;
        pos += self[pos..].span_whitespace();
        let rest = &self[pos..];
        match rest.chars().next()? {
            quote @ ('"' | '\'') => {
                let close = rest[1..].find(quote)?;
                let value = &rest[1..1 + close];
                Some((Attribute { name, value: Some(value), quote: Some(quote) }, pos + close + 2))
            },
            _ => {
                let len = rest.find(
                    |c: char| c.is_ascii_whitespace() || c == '>'
                ).unwrap_or(rest.len());
                Some((Attribute { name, value: Some(&rest[..len]), quote: None }, pos + len))
            }
        }
    }

    fn span_name(&self) -> usize {
        self.find(
            |c: char| c.is_ascii_whitespace() || c == '/' || c == '>' || c == '='
        ).unwrap_or(self.len())
    }

    fn span_whitespace(&self) -> usize {
        self.bytes().take_while(u8::is_ascii_whitespace).count()
    }
}

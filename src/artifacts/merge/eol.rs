use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EolStyle {
    Lf,
    CrLf,
    Cr,
}

impl EolStyle {
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            EolStyle::Lf => b"\n",
            EolStyle::CrLf => b"\r\n",
            EolStyle::Cr => b"\r",
        }
    }
}

impl Display for EolStyle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EolStyle::Lf => "LF",
            EolStyle::CrLf => "CRLF",
            EolStyle::Cr => "CR",
        };
        write!(f, "{}", name)
    }
}

/// Line ending found in one input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EolDetection {
    /// Most frequent style; `None` when the input has no line breaks
    pub style: Option<EolStyle>,
    /// More than one style occurs
    pub mixed: bool,
}

/// Count line endings and pick the dominant one; ties prefer CRLF, then LF
pub fn detect_eol(content: &[u8]) -> EolDetection {
    let (mut lf, mut crlf, mut cr) = (0usize, 0usize, 0usize);
    let mut index = 0;
    while index < content.len() {
        match content[index] {
            b'\r' if content.get(index + 1) == Some(&b'\n') => {
                crlf += 1;
                index += 1;
            }
            b'\r' => cr += 1,
            b'\n' => lf += 1,
            _ => {}
        }
        index += 1;
    }

    let counts = [(EolStyle::CrLf, crlf), (EolStyle::Lf, lf), (EolStyle::Cr, cr)];
    let style = counts
        .iter()
        .filter(|(_, count)| *count > 0)
        .fold(None::<(EolStyle, usize)>, |best, &(style, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((style, count)),
        })
        .map(|(style, _)| style);
    let mixed = counts.iter().filter(|(_, count)| *count > 0).count() > 1;

    EolDetection { style, mixed }
}

/// Split on the given line ending; a trailing line ending yields a final empty line
pub fn split_lines<'c>(content: &'c [u8], style: Option<EolStyle>) -> Vec<&'c [u8]> {
    let Some(style) = style else {
        return vec![content];
    };
    let separator = style.as_bytes();

    let mut lines = Vec::new();
    let mut start = 0;
    let mut index = 0;
    while index + separator.len() <= content.len() {
        if &content[index..index + separator.len()] == separator {
            lines.push(&content[start..index]);
            index += separator.len();
            start = index;
        } else {
            index += 1;
        }
    }
    lines.push(&content[start..]);

    lines
}

//! Character stream used by the scanner.
//!
//! Positions are character indices, not byte offsets, so that slicing never lands
//! inside a multi-byte character.  Saving a position is just copying a `usize`,
//! `go_back_to` is the only backtracking primitive.

/// Returned by `peek` when looking past the end of input.
pub const SENTINEL: char = '\0';

pub struct CharStream<'a> {
    chars: &'a [char],
    pos: usize
}

impl<'a> CharStream<'a> {
    pub fn new(chars: &'a [char]) -> Self {
        Self {
            chars,
            pos: 0
        }
    }
    /// Look ahead `offset` characters without moving, sentinel if past the end.
    pub fn peek(&self,offset: usize) -> char {
        match self.chars.get(self.pos + offset) {
            Some(c) => *c,
            None => SENTINEL
        }
    }
    /// Move forward by `n`, clamped to the end of input.
    pub fn advance(&mut self,n: usize) {
        self.pos = usize::min(self.pos + n,self.chars.len());
    }
    /// Advance while `pred` holds, returns the number of characters advanced.
    pub fn advance_while<F: Fn(char) -> bool>(&mut self,pred: F) -> usize {
        let start = self.pos;
        while self.pos < self.chars.len() && pred(self.chars[self.pos]) {
            self.pos += 1;
        }
        self.pos - start
    }
    pub fn pos(&self) -> usize {
        self.pos
    }
    pub fn go_back_to(&mut self,pos: usize) {
        self.pos = usize::min(pos,self.chars.len());
    }
    pub fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }
    pub fn len(&self) -> usize {
        self.chars.len()
    }
    /// Characters in `[from,to)`, both clamped to the input.
    pub fn substring(&self,from: usize,to: usize) -> String {
        let end = usize::min(to,self.chars.len());
        let beg = usize::min(from,end);
        self.chars[beg..end].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_past_end() {
        let chars: Vec<char> = "G1".chars().collect();
        let mut s = CharStream::new(&chars);
        assert_eq!(s.peek(0),'G');
        assert_eq!(s.peek(5),SENTINEL);
        s.advance(10);
        assert!(s.at_end());
        assert_eq!(s.peek(0),SENTINEL);
    }

    #[test]
    fn save_restore() {
        let chars: Vec<char> = "1234 X".chars().collect();
        let mut s = CharStream::new(&chars);
        let saved = s.pos();
        assert_eq!(s.advance_while(|c| c.is_ascii_digit()),4);
        assert_eq!(s.substring(saved,s.pos()),"1234");
        s.go_back_to(saved);
        assert_eq!(s.peek(0),'1');
    }
}

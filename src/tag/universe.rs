use std::io::{BufRead, Write};

use super::{PackedTag, TagAlphabet};
use crate::runtime::{Error, Result};

/// Dense id of a tag: its position in the sorted universe
pub type TagId = usize;

///////////////////////////////
/// The sorted, duplicate-free set of all tags of an experiment.
///
/// Ids are positions in the sorted order, so id lookup is a binary search and tag lookup is an
/// index. Read-only after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagUniverse {
    tags: Vec<PackedTag>,
}

impl TagUniverse {
    ///////////////////////////////
    /// Take ownership of tags that must already be strictly increasing
    pub fn from_sorted(tags: Vec<PackedTag>) -> Result<Self> {
        if let Some(index) = tags.windows(2).position(|w| w[0] >= w[1]) {
            return Err(Error::UnsortedInput { index });
        }
        Ok(Self { tags })
    }

    ///////////////////////////////
    /// Sort and deduplicate arbitrary tags
    pub fn from_unsorted(mut tags: Vec<PackedTag>) -> Self {
        tags.sort_unstable();
        tags.dedup();
        Self { tags }
    }

    ///////////////////////////////
    /// Read the text format: a line with the number of tags, then one tag literal per line,
    /// sorted and without duplicates
    pub fn from_text<R: BufRead>(reader: R, alphabet: TagAlphabet) -> Result<Self> {
        let mut lines = reader.lines();

        let count_line = match lines.next() {
            Some(line) => line?,
            None => {
                return Err(Error::parse_error(
                    "tag list",
                    Some("empty input, expected a count line"),
                ))
            }
        };
        let num_tags: usize = count_line.trim().parse().map_err(|_| {
            Error::parse_error(
                "tag list count line",
                Some(format!("\"{}\" is not a tag count", count_line.trim())),
            )
        })?;

        //The count line is not trusted for the allocation
        let mut tags = Vec::with_capacity(num_tags.min(1 << 20));
        for line in lines.by_ref().take(num_tags) {
            let line = line?;
            tags.push(PackedTag::from_literal(line.trim_end().as_bytes(), alphabet)?);
        }
        if tags.len() < num_tags {
            return Err(Error::TruncatedInput {
                what: "tags".to_string(),
                read: tags.len(),
                expected: num_tags,
            });
        }

        //Allow trailing blank lines but nothing else
        for line in lines {
            let line = line?;
            if !line.trim().is_empty() {
                return Err(Error::parse_error(
                    "tag list",
                    Some(format!("extra unexpected line \"{}\" found after tags", line)),
                ));
            }
        }

        let universe = Self::from_sorted(tags)?;
        log::debug!("Read tag universe of {} tags", universe.len());
        Ok(universe)
    }

    ///////////////////////////////
    /// Write the text format read by from_text
    pub fn write_text<W: Write>(&self, writer: &mut W, alphabet: TagAlphabet) -> Result<()> {
        writeln!(writer, "{}", self.len())?;
        for tag in &self.tags {
            writeln!(writer, "{}", tag.to_literal(alphabet)?)?;
        }
        Ok(())
    }

    pub fn has(&self, tag: &PackedTag) -> bool {
        self.tags.binary_search(tag).is_ok()
    }

    pub fn id_of(&self, tag: &PackedTag) -> Option<TagId> {
        self.tags.binary_search(tag).ok()
    }

    ///////////////////////////////
    /// Id of a tag that must be in the universe
    pub fn id_of_or_die(&self, tag: &PackedTag) -> Result<TagId> {
        self.id_of(tag).ok_or_else(|| {
            Error::unknown_tag(
                tag.to_literal(TagAlphabet::Numeric)
                    .unwrap_or_else(|_| format!("{:?}", tag)),
            )
        })
    }

    pub fn tag_of(&self, id: TagId) -> Result<&PackedTag> {
        self.tags
            .get(id)
            .ok_or_else(|| Error::index_out_of_range("tag universe", id, self.tags.len()))
    }

    pub fn literal_of(&self, id: TagId, alphabet: TagAlphabet) -> Result<String> {
        self.tag_of(id)?.to_literal(alphabet)
    }

    ///////////////////////////////
    /// Parse a literal and look it up in one go
    pub fn id_of_literal(&self, literal: &str, alphabet: TagAlphabet) -> Result<Option<TagId>> {
        let tag = PackedTag::from_literal(literal.as_bytes(), alphabet)?;
        Ok(self.id_of(&tag))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PackedTag> {
        self.tags.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(s: &str) -> PackedTag {
        PackedTag::from_literal(s.as_bytes(), TagAlphabet::Numeric).unwrap()
    }

    fn universe() -> TagUniverse {
        TagUniverse::from_sorted(vec![tag("0000"), tag("0123"), tag("1000"), tag("3333")]).unwrap()
    }

    #[test]
    fn lookups() {
        let u = universe();
        assert_eq!(u.len(), 4);
        assert!(u.has(&tag("0123")));
        assert!(!u.has(&tag("0122")));
        assert_eq!(u.id_of(&tag("1000")), Some(2));
        assert_eq!(u.id_of(&tag("2000")), None);
        assert_eq!(u.tag_of(3).unwrap(), &tag("3333"));

        for t in u.iter() {
            let id = u.id_of(t).unwrap();
            assert_eq!(u.id_of(u.tag_of(id).unwrap()), Some(id));
        }
    }

    #[test]
    fn lookup_failures() {
        let u = universe();
        match u.id_of_or_die(&tag("2222")) {
            Err(Error::UnknownTag { tag }) => assert_eq!(tag, "2222"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            u.tag_of(4),
            Err(Error::IndexOutOfRange { index: 4, len: 4, .. })
        ));
    }

    #[test]
    fn unsorted_is_rejected() {
        assert!(matches!(
            TagUniverse::from_sorted(vec![tag("01"), tag("00")]),
            Err(Error::UnsortedInput { index: 0 })
        ));
        assert!(matches!(
            TagUniverse::from_sorted(vec![tag("00"), tag("01"), tag("01")]),
            Err(Error::UnsortedInput { index: 1 })
        ));
    }

    #[test]
    fn from_unsorted_sorts_and_dedups() {
        let u = TagUniverse::from_unsorted(vec![tag("3"), tag("1"), tag("3"), tag("0")]);
        assert_eq!(u, TagUniverse::from_sorted(vec![tag("0"), tag("1"), tag("3")]).unwrap());
    }

    #[test]
    fn text_roundtrip() {
        let input = "3\nAACG\nACGT\nTTTT\n";
        let u = TagUniverse::from_text(input.as_bytes(), TagAlphabet::Dna).unwrap();
        assert_eq!(u.len(), 3);
        assert_eq!(u.literal_of(1, TagAlphabet::Numeric).unwrap(), "0123");
        assert_eq!(
            u.id_of_literal("ACGT", TagAlphabet::Dna).unwrap(),
            Some(1)
        );

        let mut out = Vec::new();
        u.write_text(&mut out, TagAlphabet::Dna).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), input);
    }

    #[test]
    fn text_errors() {
        let r = TagUniverse::from_text("3\n00\n01\n".as_bytes(), TagAlphabet::Numeric);
        assert!(matches!(
            r,
            Err(Error::TruncatedInput {
                read: 2,
                expected: 3,
                ..
            })
        ));

        let r = TagUniverse::from_text("99999999999999999\n00\n".as_bytes(), TagAlphabet::Numeric);
        assert!(matches!(
            r,
            Err(Error::TruncatedInput {
                read: 1,
                expected: 99999999999999999,
                ..
            })
        ));

        let r = TagUniverse::from_text("1\n00\n01\n".as_bytes(), TagAlphabet::Numeric);
        assert!(matches!(r, Err(Error::ParseError { .. })));

        let r = TagUniverse::from_text("two\n00\n".as_bytes(), TagAlphabet::Numeric);
        assert!(matches!(r, Err(Error::ParseError { .. })));

        let r = TagUniverse::from_text("".as_bytes(), TagAlphabet::Numeric);
        assert!(matches!(r, Err(Error::ParseError { .. })));

        let r = TagUniverse::from_text("2\n01\n00\n".as_bytes(), TagAlphabet::Numeric);
        assert!(matches!(r, Err(Error::UnsortedInput { index: 0 })));

        let r = TagUniverse::from_text("1\n0N\n".as_bytes(), TagAlphabet::Numeric);
        assert!(matches!(r, Err(Error::InvalidSymbol { .. })));
    }
}

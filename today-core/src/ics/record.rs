use crate::slice::Slice;

/// Block types named by `BEGIN:`/`END:` records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block<'a> {
    Calendar,
    Event,
    /// Any other block (VALARM, VTIMEZONE, ...). Its records are ignored.
    Other(Slice<'a>),
}

impl<'a> Block<'a> {
    fn from_value(value: Slice<'a>) -> Self {
        if value.equals("VCALENDAR") {
            Block::Calendar
        } else if value.equals("VEVENT") {
            Block::Event
        } else {
            Block::Other(value)
        }
    }
}

/// One `KEY:VALUE` line, classified by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record<'a> {
    Begin(Block<'a>),
    End(Block<'a>),
    CalendarName(Slice<'a>),
    Summary(Slice<'a>),
    DtStart(Slice<'a>),
    DtEnd(Slice<'a>),
    Uid(Slice<'a>),
    Categories(Slice<'a>),
    Location(Slice<'a>),
    Geo(Slice<'a>),
    Unknown,
}

impl<'a> Record<'a> {
    /// Classify a line. The line is trimmed, then split on its first colon; a
    /// line without a colon has an empty value. Parameters after `;` in the
    /// key are not part of the property name.
    pub fn classify(line: Slice<'a>) -> Record<'a> {
        let parts = line.trimmed().split(":", 1);
        let key = parts.first().copied().unwrap_or_default();
        let value = parts.get(1).copied().unwrap_or_default();
        let name = key.split(";", 1).first().copied().unwrap_or_default();

        match name.as_bytes() {
            b"BEGIN" => Record::Begin(Block::from_value(value)),
            b"END" => Record::End(Block::from_value(value)),
            b"X-WR-CALNAME" => Record::CalendarName(value),
            b"SUMMARY" => Record::Summary(value),
            b"DTSTART" => Record::DtStart(value),
            b"DTEND" => Record::DtEnd(value),
            b"UID" => Record::Uid(value),
            b"CATEGORIES" => Record::Categories(value),
            b"LOCATION" => Record::Location(value),
            b"GEO" => Record::Geo(value),
            _ => Record::Unknown,
        }
    }
}

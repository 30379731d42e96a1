use rust_decimal::Decimal;

/// Dollar amount with thousand separators and two decimals, e.g. `$1,234.50`.
pub(crate) fn format_amount(val: Decimal) -> String {
    let formatted = format!("{:.2}", val.abs());
    let (int_part, dec_part) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if val < Decimal::ZERO { "-" } else { "" };
    format!("{sign}${grouped}.{dec_part}")
}

/// Truncate to at most `max` characters, the last one being "…" when cut.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max - 1).collect();
    format!("{kept}…")
}

/// Selected row plus the first visible row of a scrolling list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ListCursor {
    pub(crate) index: usize,
    pub(crate) scroll: usize,
}

impl ListCursor {
    pub(crate) fn down(&mut self, len: usize, page: usize) {
        if self.index + 1 < len {
            self.index += 1;
            if self.index >= self.scroll + page {
                self.scroll = self.index.saturating_sub(page.saturating_sub(1));
            }
        }
    }

    pub(crate) fn up(&mut self) {
        self.index = self.index.saturating_sub(1);
        if self.index < self.scroll {
            self.scroll = self.index;
        }
    }

    pub(crate) fn top(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn bottom(&mut self, len: usize, page: usize) {
        if len > 0 {
            self.index = len - 1;
            self.scroll = self.index.saturating_sub(page.saturating_sub(1));
        }
    }

    /// Pull the cursor back inside a list that may have shrunk.
    pub(crate) fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.top();
            return;
        }
        if self.index >= len {
            self.index = len - 1;
        }
        if self.scroll > self.index {
            self.scroll = self.index;
        }
    }
}

use std::fmt::{self, Write};

/// A plain, space-aligned table. Header cells never contain whitespace, so the
/// output stays easy to split with `awk` or `cut`.
pub(crate) struct Table {
    header: Vec<String>,
    body: Vec<Vec<String>>,
    print_header: bool,
}

impl Table {
    pub(crate) fn with_header(header: &[&str]) -> Table {
        debug_assert!(
            header.iter().all(|cell| !cell.contains(char::is_whitespace)),
            "table header is not awk safe, contains whitespace"
        );

        Table {
            header: header.iter().map(|cell| cell.to_string()).collect(),
            body: Vec::new(),
            print_header: true,
        }
    }

    pub(crate) fn print_header(&mut self, print_header: bool) {
        self.print_header = print_header;
    }

    pub(crate) fn add_row(&mut self, row: Vec<String>) {
        assert_eq!(
            row.len(),
            self.header.len(),
            "row width does not match the header"
        );

        self.body.push(row);
    }

    fn rows(&self) -> impl Iterator<Item = &Vec<String>> {
        let header = if self.print_header {
            Some(&self.header)
        } else {
            None
        };

        header.into_iter().chain(self.body.iter())
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths = vec![0usize; self.header.len()];

        for row in self.rows() {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        widths
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.column_widths();

        for row in self.rows() {
            let last = row.len() - 1;

            for (i, cell) in row.iter().enumerate() {
                if i == last {
                    // No trailing padding on the final column
                    f.write_str(cell)?;
                } else {
                    write!(f, "{:<width$}  ", cell, width = widths[i])?;
                }
            }

            f.write_char('\n')?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        let mut tab = Table::with_header(&["#", "LABEL"]);

        tab.add_row(vec!["1".to_string(), "FedRAMP Requirements".to_string()]);
        tab.add_row(vec!["10".to_string(), "FISMA".to_string()]);

        tab
    }

    #[test]
    fn test_alignment() {
        assert_eq!(
            table().to_string(),
            "#   LABEL\n1   FedRAMP Requirements\n10  FISMA\n"
        );
    }

    #[test]
    fn test_headerless() {
        let mut tab = table();

        tab.print_header(false);

        assert_eq!(tab.to_string(), "1   FedRAMP Requirements\n10  FISMA\n");
    }
}

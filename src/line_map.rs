//! `#line` directive mapping for `LineNumber`/`FilePath` substitution.
//!
//! The host's lexer records where directives sit; this module answers "what
//! line/file does physical line N report as". Hidden regions do not reset the
//! mapping: a call inside `#line hidden` carries whatever mapping was last in
//! force, and physical numbering applies when no mapping ever was.

/// What a single directive declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `#line N` or `#line N "file"`. A missing file inherits the one
    /// currently in force.
    Map { line: u32, path: Option<String> },
    /// `#line hidden`.
    Hidden,
    /// `#line default`.
    Default,
}

/// A directive plus the physical (1-based) line it occupies. Mapping takes
/// effect on the following physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDirective {
    pub physical_line: u32,
    pub kind: DirectiveKind,
}

impl LineDirective {
    #[must_use]
    pub fn map(physical_line: u32, line: u32, path: Option<&str>) -> Self {
        Self {
            physical_line,
            kind: DirectiveKind::Map {
                line,
                path: path.map(str::to_string),
            },
        }
    }

    #[must_use]
    pub fn hidden(physical_line: u32) -> Self {
        Self {
            physical_line,
            kind: DirectiveKind::Hidden,
        }
    }

    #[must_use]
    pub fn restore_default(physical_line: u32) -> Self {
        Self {
            physical_line,
            kind: DirectiveKind::Default,
        }
    }
}

/// Where a physical line reports itself. `path == None` means the physical
/// source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedLocation {
    pub line: u32,
    pub path: Option<String>,
}

/// All directives of one source file, in physical order.
#[derive(Debug, Clone, Default)]
pub struct LineMap {
    directives: Vec<LineDirective>,
}

impl LineMap {
    #[must_use]
    pub fn new(mut directives: Vec<LineDirective>) -> Self {
        directives.sort_by_key(|directive| directive.physical_line);
        Self { directives }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Report the declared location of a physical line.
    #[must_use]
    pub fn map(&self, physical_line: u32) -> MappedLocation {
        // (directive line, declared start line) of the mapping in force.
        let mut mapping: Option<(u32, u32)> = None;
        let mut path: Option<String> = None;
        for directive in &self.directives {
            if directive.physical_line >= physical_line {
                break;
            }
            match &directive.kind {
                DirectiveKind::Map {
                    line,
                    path: declared_path,
                } => {
                    mapping = Some((directive.physical_line, *line));
                    if let Some(declared_path) = declared_path {
                        path = Some(declared_path.clone());
                    }
                }
                DirectiveKind::Default => {
                    mapping = None;
                    path = None;
                }
                DirectiveKind::Hidden => {}
            }
        }
        match mapping {
            Some((directive_line, declared)) => MappedLocation {
                line: declared + (physical_line - directive_line - 1),
                path,
            },
            None => MappedLocation {
                line: physical_line,
                path,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_directives_means_physical_numbering() {
        let map = LineMap::default();
        assert_eq!(
            map.map(7),
            MappedLocation {
                line: 7,
                path: None
            }
        );
    }

    #[test]
    fn mapping_starts_on_the_following_line_and_increments() {
        let map = LineMap::new(vec![LineDirective::map(10, 30, Some("abc"))]);
        assert_eq!(map.map(10).line, 10); // the directive's own line is unmapped
        assert_eq!(
            map.map(11),
            MappedLocation {
                line: 30,
                path: Some("abc".to_string())
            }
        );
        assert_eq!(map.map(13).line, 32);
    }

    #[test]
    fn missing_file_inherits_the_mapping_in_force() {
        let map = LineMap::new(vec![
            LineDirective::map(2, 100, Some("gen.cm")),
            LineDirective::map(5, 200, None),
        ]);
        let mapped = map.map(6);
        assert_eq!(mapped.line, 200);
        assert_eq!(mapped.path.as_deref(), Some("gen.cm"));
    }

    #[test]
    fn hidden_regions_carry_the_last_mapping() {
        let map = LineMap::new(vec![
            LineDirective::map(2, 50, Some("abc")),
            LineDirective::hidden(4),
        ]);
        // Inside the hidden region the "abc":50-based mapping still counts.
        let mapped = map.map(6);
        assert_eq!(mapped.line, 53);
        assert_eq!(mapped.path.as_deref(), Some("abc"));
    }

    #[test]
    fn hidden_region_without_prior_mapping_stays_physical() {
        let map = LineMap::new(vec![LineDirective::hidden(3)]);
        assert_eq!(map.map(5).line, 5);
        assert_eq!(map.map(5).path, None);
    }

    #[test]
    fn default_restores_physical_numbering_and_path() {
        let map = LineMap::new(vec![
            LineDirective::map(2, 50, Some("abc")),
            LineDirective::restore_default(6),
        ]);
        assert_eq!(map.map(4).line, 51);
        assert_eq!(
            map.map(8),
            MappedLocation {
                line: 8,
                path: None
            }
        );
    }
}

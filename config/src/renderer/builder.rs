// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Line-oriented builder for configuration files

use std::fmt::Display;
use std::ops::AddAssign;

/// Objects that render as a piece of configuration
pub trait Render {
    type Context;
    type Output;
    fn render(&self, ctx: &Self::Context) -> Self::Output;
}

/// Accumulates configuration lines. Lines are joined with a newline when displayed,
/// without one after the last line.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConfigBuilder {
    lines: Vec<String>,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an empty line
    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

impl AddAssign<&str> for ConfigBuilder {
    fn add_assign(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

impl AddAssign<String> for ConfigBuilder {
    fn add_assign(&mut self, line: String) {
        self.lines.push(line);
    }
}

impl AddAssign<ConfigBuilder> for ConfigBuilder {
    fn add_assign(&mut self, mut other: ConfigBuilder) {
        self.lines.append(&mut other.lines);
    }
}

impl Display for ConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut lines = self.lines.iter();
        if let Some(first) = lines.next() {
            f.write_str(first)?;
        }
        for line in lines {
            f.write_str("\n")?;
            f.write_str(line)?;
        }
        Ok(())
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Display of the config database

use crate::processor::configdb::{ConfigDatabase, ConfigMeta};
use chrono::{DateTime, Utc};
use std::fmt::Display;

macro_rules! CONFIGDB_TBL_FMT {
    () => {
        " {:>6} {:<25} {:<25} {}"
    };
}

impl Display for ConfigMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let created = DateTime::<Utc>::from(self.create_t).format("%H:%M:%S on %Y/%m/%d");
        let apply_time = if let Some(time) = self.apply_t {
            let time = DateTime::<Utc>::from(time).format("%H:%M:%S on %Y/%m/%d");
            format!("{time}")
        } else {
            "--".to_string()
        };
        let error = self.error.as_deref().unwrap_or("none");

        write!(
            f,
            "{}",
            format_args!(CONFIGDB_TBL_FMT!(), self.genid, created, apply_time, error)
        )
    }
}

impl Display for ConfigDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, " ━━━━━━━━━━━━━━━━━━ Config history ━━━━━━━━━━━━━━━━━━")?;
        match self.get_current_gen() {
            Some(genid) => writeln!(f, " current generation: {genid}")?,
            None => writeln!(f, " current generation: --")?,
        }
        writeln!(
            f,
            "{}",
            format_args!(CONFIGDB_TBL_FMT!(), "GenId", "created", "applied", "error")
        )?;
        for meta in self.history() {
            writeln!(f, "{meta}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::{Duration, SystemTime};

    #[test]
    fn test_config_meta_timestamps() {
        // 2024/03/01 12:34:56 UTC
        let create_t = SystemTime::UNIX_EPOCH + Duration::from_secs(1_709_296_496);
        let meta = ConfigMeta {
            genid: 3,
            create_t,
            apply_t: Some(create_t + Duration::from_secs(2)),
            error: None,
        };
        assert_eq!(
            meta.to_string(),
            "      3 12:34:56 on 2024/03/01    12:34:58 on 2024/03/01    none"
        );

        let failed = ConfigMeta {
            apply_t: None,
            error: Some("push refused".to_string()),
            ..meta
        };
        assert_eq!(
            failed.to_string(),
            "      3 12:34:56 on 2024/03/01    --                        push refused"
        );
    }

    #[test]
    fn test_config_history() {
        let mut db = ConfigDatabase::new();
        let genid = db.learn("content");
        db.mark_applied(genid);
        let history = db.to_string();
        assert!(history.contains(" current generation: 1\n"));
        assert!(history.contains(" GenId created"));
        assert_eq!(history.lines().count(), 4);
    }
}

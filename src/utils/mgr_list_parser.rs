use crate::models::{Manager, StartMode};

pub(crate) const TERMINATOR: &str = ";";

/// Parses the output of `MGRLIST:LIST`.
///
/// Expected shape:
///
/// ```text
/// LIST:2
/// WCCILevent;2;30;3;1;
/// WCCOActrl;0;60;3;1;-f pvss_scripts.lst
/// ;
/// ```
///
/// Lines outside the `LIST:` .. `;` block are ignored and rows with fewer than
/// five fields are skipped. Everything after the fifth field is kept as the
/// argument string, semicolons included. A manager's index is its row
/// position in the block, so skipped rows leave gaps.
pub fn parse_manager_list(output: &str) -> Vec<Manager> {
    let mut managers = Vec::new();
    let mut in_block = false;
    let mut row = 0usize;

    for line in output.lines() {
        let line = line.trim();

        if !in_block {
            if line.starts_with("LIST:") {
                in_block = true;
            }
            continue;
        }

        if line == TERMINATOR {
            break;
        }
        if line.is_empty() {
            continue;
        }

        let index = row;
        row += 1;

        let fields: Vec<&str> = line.split(';').collect();
        if fields.len() < 5 {
            continue;
        }

        let args = if fields.len() > 5 {
            let joined = fields[5..].join(";");
            let joined = joined.trim();
            if joined.is_empty() {
                None
            } else {
                Some(joined.to_string())
            }
        } else {
            None
        };

        managers.push(Manager {
            index,
            name: fields[0].trim().to_string(),
            start_mode: StartMode::from_code(fields[1]),
            sec_kill: parse_int(fields[2]),
            restart_count: parse_int(fields[3]),
            reset_min: parse_int(fields[4]),
            args,
            ..Default::default()
        });
    }

    managers
}

pub(crate) fn parse_int(field: &str) -> i32 {
    field.trim().parse::<i32>().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_managers() {
        let output = "LIST:2\nfoo;2;-1;3;1;\nbar;0;60;3;1;-num 5\n;\n";
        let managers = parse_manager_list(output);

        assert_eq!(managers.len(), 2);

        assert_eq!(managers[0].index, 0);
        assert_eq!(managers[0].name, "foo");
        assert_eq!(managers[0].start_mode, StartMode::Always);
        assert_eq!(managers[0].sec_kill, -1);
        assert_eq!(managers[0].restart_count, 3);
        assert_eq!(managers[0].reset_min, 1);
        assert_eq!(managers[0].args, None);

        assert_eq!(managers[1].index, 1);
        assert_eq!(managers[1].name, "bar");
        assert_eq!(managers[1].start_mode, StartMode::Manual);
        assert_eq!(managers[1].sec_kill, 60);
        assert_eq!(managers[1].args.as_deref(), Some("-num 5"));
    }

    #[test]
    fn keeps_semicolons_inside_args() {
        let output = "LIST:1\nWCCOActrl;1;30;3;1;-f a.lst;-num 2\n;\n";
        let managers = parse_manager_list(output);
        assert_eq!(managers.len(), 1);
        assert_eq!(managers[0].start_mode, StartMode::Once);
        assert_eq!(managers[0].args.as_deref(), Some("-f a.lst;-num 2"));
    }

    #[test]
    fn ignores_noise_and_malformed_rows() {
        let output = "\
pmon log: connecting
foo;2;30;3;1
LIST:3
WCCILevent;2;30;3;1;
broken;2;30
WCCILdata;7;30;3;1;

;
after;2;30;3;1;
";
        let managers = parse_manager_list(output);
        let names: Vec<&str> = managers.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["WCCILevent", "WCCILdata"]);
        // the broken row still occupies position 1
        assert_eq!(managers[1].index, 2);
        // unknown start mode code
        assert_eq!(managers[1].start_mode, StartMode::Manual);
    }

    #[test]
    fn missing_header_yields_nothing() {
        assert!(parse_manager_list("foo;2;30;3;1;\n;\n").is_empty());
        assert!(parse_manager_list("").is_empty());
    }
}

use crate::models::{
    Manager, ManagerStatusReport, ProjectState, ProjectStatus, RunningState, StartMode,
};
use crate::utils::mgr_list_parser::TERMINATOR;
use chrono::NaiveDateTime;

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y.%m.%d %H:%M:%S%.f", "%Y.%m.%d %H:%M:%S"];

/// Parses the output of `MGRLIST:STATI`.
///
/// Manager rows look like `state;pid;startMode;YYYY.MM.DD hh:mm:ss.mmm;number`.
/// The row directly before the closing `;` is the project state line
/// (`<code> <text> <emergency> <demo>`, space separated) and is never read as
/// a manager. A manager's index is its row position in the block, so a
/// skipped row does not shift the rows after it.
pub fn parse_manager_status(output: &str) -> ManagerStatusReport {
    let lines: Vec<&str> = output.lines().map(str::trim).collect();
    let mut report = ManagerStatusReport::default();
    let mut row = 0usize;

    let start = match lines
        .iter()
        .position(|l| l.starts_with("STATI:") || l.starts_with("LIST:"))
    {
        Some(header) => header + 1,
        None => return report,
    };

    for (i, line) in lines.iter().enumerate().skip(start) {
        if *line == TERMINATOR {
            break;
        }
        if line.is_empty() {
            continue;
        }

        let next = lines[i + 1..].iter().find(|l| !l.is_empty());
        if next == Some(&TERMINATOR) {
            if report.project_state.is_none() {
                report.project_state = Some(parse_project_state(line));
            }
            continue;
        }

        if let Some(manager) = parse_status_row(line, row) {
            report.managers.push(manager);
        }
        row += 1;
    }

    report
}

fn parse_status_row(line: &str, index: usize) -> Option<Manager> {
    let fields: Vec<&str> = line.split(';').map(str::trim).collect();
    if fields.len() < 5 {
        return None;
    }

    let running_state = RunningState::from_code(fields[0])?;
    let pid = match fields[1].parse::<i32>() {
        Ok(-1) | Err(_) => None,
        Ok(pid) => Some(pid),
    };

    Some(Manager {
        index,
        start_mode: StartMode::from_code(fields[2]),
        running_state: Some(running_state),
        pid,
        start_time: parse_timestamp(fields[3]),
        manager_number: fields[4].parse::<i32>().ok(),
        ..Default::default()
    })
}

fn parse_project_state(line: &str) -> ProjectState {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let code = tokens
        .first()
        .and_then(|t| t.parse::<i32>().ok())
        .unwrap_or(-1);

    let (text, emergency, demo) = if tokens.len() >= 4 {
        let n = tokens.len();
        (
            tokens[1..n - 2].join(" "),
            tokens[n - 2] == "1",
            tokens[n - 1] == "1",
        )
    } else {
        (tokens.get(1..).map(|t| t.join(" ")).unwrap_or_default(), false, false)
    };

    ProjectState {
        status: ProjectStatus::from_code(code),
        text,
        emergency,
        demo,
    }
}

/// `1970.*`, `-1`, `0` and empty values mean "never started".
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() || value == "-1" || value == "0" || value.starts_with("1970.") {
        return None;
    }

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

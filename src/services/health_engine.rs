use crate::models::{
    Grade, HealthComponents, HealthScore, Manager, ProjectState, ProjectStatus, RunningState,
    StartMode,
};
use chrono::{Duration, Local, NaiveDateTime};

/// Managers a project cannot work without.
pub const CRITICAL_MANAGERS: [&str; 2] = ["WCCILevent", "WCCILdata"];

const MANAGER_WEIGHT: f64 = 0.4;
const STATE_WEIGHT: f64 = 0.3;
const PERFORMANCE_WEIGHT: f64 = 0.2;
const RELIABILITY_WEIGHT: f64 = 0.1;

#[derive(Default)]
struct Findings {
    issues: Vec<String>,
    recommendations: Vec<String>,
}

impl Findings {
    fn issue(&mut self, text: impl Into<String>) {
        self.issues.push(text.into());
    }

    fn recommend(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !self.recommendations.contains(&text) {
            self.recommendations.push(text);
        }
    }
}

pub fn compute_health(managers: &[Manager], state: Option<&ProjectState>) -> HealthScore {
    compute_health_at(managers, state, Local::now().naive_local())
}

/// Same as [`compute_health`] with an explicit "now" for uptime checks.
pub fn compute_health_at(
    managers: &[Manager],
    state: Option<&ProjectState>,
    now: NaiveDateTime,
) -> HealthScore {
    let mut findings = Findings::default();

    let components = HealthComponents {
        manager_health: manager_health(managers, &mut findings),
        project_state_health: project_state_health(state, &mut findings),
        performance_health: performance_health(managers, now, &mut findings),
        reliability_health: reliability_health(managers, state, now, &mut findings),
    };

    let overall = components.manager_health * MANAGER_WEIGHT
        + components.project_state_health * STATE_WEIGHT
        + components.performance_health * PERFORMANCE_WEIGHT
        + components.reliability_health * RELIABILITY_WEIGHT;
    let overall_score = clamp(overall).round() as u8;
    let grade = Grade::from_score(overall_score);

    HealthScore {
        overall_score,
        grade,
        status: grade.label().to_string(),
        issues: findings.issues,
        recommendations: findings.recommendations,
        components,
    }
}

fn clamp(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

fn label(manager: &Manager) -> String {
    if manager.name.is_empty() {
        format!("#{}", manager.index)
    } else {
        manager.name.clone()
    }
}

fn manager_health(managers: &[Manager], findings: &mut Findings) -> f64 {
    if managers.is_empty() {
        findings.issue("No managers found");
        findings.recommend("Check that the project configuration defines managers");
        return 0.0;
    }

    let total = managers.len() as f64;
    let mut fatal = Vec::new();
    let mut blocked = Vec::new();
    let mut stopped = 0usize;
    let mut init = 0usize;
    let mut running = 0usize;

    for manager in managers {
        if manager.is_fatal() {
            fatal.push(label(manager));
            continue;
        }
        match manager.running_state.unwrap_or(RunningState::Stopped) {
            RunningState::Running => running += 1,
            RunningState::Init => init += 1,
            RunningState::Blocked => blocked.push(label(manager)),
            RunningState::Stopped => stopped += 1,
        }
    }

    let not_running = fatal.len() + blocked.len() + stopped;
    let mut score = 100.0 - 50.0 * (not_running as f64 / total);

    if not_running > 0 {
        findings.issue(format!(
            "{} of {} managers are not running",
            not_running,
            managers.len()
        ));
    }

    for name in &fatal {
        score -= 15.0;
        findings.issue(format!("Manager {} has a fatal startup error", name));
    }
    if !fatal.is_empty() {
        findings.recommend("Check the manager logs for the cause of the fatal startup error");
    }

    for name in &blocked {
        score -= 10.0;
        findings.issue(format!("Manager {} is blocked", name));
    }
    if !blocked.is_empty() {
        findings.recommend("Investigate blocked managers; restart them if they do not recover");
    }

    if init as f64 / total > 0.3 {
        score -= 5.0;
        findings.issue(format!("{} managers are still initializing", init));
        findings.recommend("Wait for startup to complete and check again");
    }

    if running == managers.len() {
        score += 5.0;
    }

    clamp(score)
}

fn project_state_health(state: Option<&ProjectState>, findings: &mut Findings) -> f64 {
    let state = match state {
        Some(state) => state,
        None => {
            findings.issue("Project state is not available");
            return 50.0;
        }
    };

    let mut score: f64 = match state.status {
        ProjectStatus::Monitoring => 100.0,
        ProjectStatus::Starting => 80.0,
        ProjectStatus::Restarting => 70.0,
        ProjectStatus::Stopping => 40.0,
        ProjectStatus::Down => 30.0,
        ProjectStatus::Unknown => 20.0,
    };

    match state.status {
        ProjectStatus::Monitoring => {}
        ProjectStatus::Starting => findings.issue("Project is starting"),
        ProjectStatus::Restarting => findings.issue("Project is restarting"),
        ProjectStatus::Stopping => findings.issue("Project is stopping"),
        ProjectStatus::Down => {
            findings.issue("Project is down");
            findings.recommend("Start the project");
        }
        ProjectStatus::Unknown => {
            findings.issue("Project state is unknown");
            findings.recommend("Check whether pmon is reachable for this project");
        }
    }

    if state.emergency {
        score -= 30.0;
        findings.issue("Project is in emergency mode");
        findings.recommend("Resolve the emergency condition and restart the project");
    }
    if state.demo {
        score -= 10.0;
        findings.issue("Project is running in demo mode");
        findings.recommend("Install a valid license");
    }

    clamp(score)
}

fn performance_health(managers: &[Manager], now: NaiveDateTime, findings: &mut Findings) -> f64 {
    let mut score = 100.0;
    let total = managers.len();
    if total == 0 {
        return score;
    }

    let never_killed = managers.iter().filter(|m| m.sec_kill < 0).count();
    if never_killed * 2 > total {
        score -= 10.0;
        findings.issue(format!(
            "{} of {} managers are not stopped on project restart",
            never_killed, total
        ));
        findings.recommend("Review the secKill settings of the managers");
    }

    for manager in managers.iter().filter(|m| m.restart_count > 5) {
        score -= 5.0;
        findings.issue(format!(
            "Manager {} has a high restart count ({})",
            label(manager),
            manager.restart_count
        ));
    }
    if managers.iter().any(|m| m.restart_count > 5) {
        findings.recommend("Lower the restart count or fix the managers that keep restarting");
    }

    let manual = managers
        .iter()
        .filter(|m| m.start_mode == StartMode::Manual)
        .count();
    let always = managers
        .iter()
        .filter(|m| m.start_mode == StartMode::Always)
        .count();
    if manual > always {
        score -= 5.0;
        findings.issue(format!(
            "More managers start manually ({}) than always ({})",
            manual, always
        ));
        findings.recommend("Use start mode 'always' for managers the project depends on");
    }

    let recent = managers
        .iter()
        .filter(|m| {
            m.uptime(now)
                .map(|up| up >= Duration::zero() && up < Duration::minutes(5))
                .unwrap_or(false)
        })
        .count();
    if total > 2 && recent * 2 > total {
        score -= 10.0;
        findings.issue(format!(
            "{} of {} managers started within the last 5 minutes",
            recent, total
        ));
        findings.recommend("Check for a recent mass restart");
    }

    clamp(score)
}

fn reliability_health(
    managers: &[Manager],
    state: Option<&ProjectState>,
    now: NaiveDateTime,
    findings: &mut Findings,
) -> f64 {
    let mut score = 100.0;

    let missing: Vec<&str> = CRITICAL_MANAGERS
        .iter()
        .copied()
        .filter(|name| !managers.iter().any(|m| m.name == *name && m.is_running()))
        .collect();
    if !missing.is_empty() {
        score -= 40.0 * missing.len() as f64 / CRITICAL_MANAGERS.len() as f64;
        findings.issue(format!(
            "Critical managers not running: {}",
            missing.join(", ")
        ));
        findings.recommend("Start the event and data managers first");
    }

    let ui: Vec<&Manager> = managers.iter().filter(|m| is_ui_manager(m)).collect();
    if !ui.is_empty() && !ui.iter().any(|m| m.is_running()) {
        score -= 15.0;
        findings.issue("No UI manager is running");
    }

    let monitoring = state.map(|s| s.status == ProjectStatus::Monitoring).unwrap_or(false);
    let long_running = !managers.is_empty()
        && managers.iter().all(|m| {
            m.uptime(now)
                .map(|up| up > Duration::hours(24))
                .unwrap_or(false)
        });
    if monitoring && long_running {
        score += 5.0;
    }

    clamp(score)
}

fn is_ui_manager(manager: &Manager) -> bool {
    manager.name.to_lowercase().ends_with("ui")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FATAL_PID;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap()
    }

    fn manager(index: usize, name: &str, state: RunningState) -> Manager {
        Manager {
            index,
            name: name.to_string(),
            start_mode: StartMode::Always,
            sec_kill: 30,
            restart_count: 3,
            reset_min: 1,
            running_state: Some(state),
            pid: match state {
                RunningState::Running | RunningState::Init => Some(1000 + index as i32),
                _ => None,
            },
            start_time: Some(now() - Duration::days(2)),
            manager_number: Some(index as i32),
            ..Default::default()
        }
    }

    fn healthy() -> Vec<Manager> {
        vec![
            manager(0, "WCCILevent", RunningState::Running),
            manager(1, "WCCILdata", RunningState::Running),
            manager(2, "WCCOActrl", RunningState::Running),
            manager(3, "WCCOAui", RunningState::Running),
        ]
    }

    fn monitoring() -> ProjectState {
        ProjectState {
            status: ProjectStatus::Monitoring,
            text: "MONITOR_MODE".to_string(),
            emergency: false,
            demo: false,
        }
    }

    #[test]
    fn healthy_project_scores_full_marks() {
        let score = compute_health_at(&healthy(), Some(&monitoring()), now());
        assert_eq!(score.overall_score, 100);
        assert_eq!(score.grade, Grade::A);
        assert_eq!(score.status, "Excellent");
        assert!(score.issues.is_empty(), "{:?}", score.issues);
    }

    #[test]
    fn no_managers_is_zero_with_issue() {
        let score = compute_health_at(&[], Some(&monitoring()), now());
        assert_eq!(score.components.manager_health, 0.0);
        assert!(score.issues.iter().any(|i| i == "No managers found"));
    }

    #[test]
    fn absent_state_is_neutral() {
        let score = compute_health_at(&healthy(), None, now());
        assert_eq!(score.components.project_state_health, 50.0);
    }

    #[test]
    fn state_flags_reduce_state_score() {
        let state = ProjectState {
            status: ProjectStatus::Down,
            text: "DOWN".to_string(),
            emergency: true,
            demo: true,
        };
        let score = compute_health_at(&healthy(), Some(&state), now());
        assert_eq!(score.components.project_state_health, 0.0);

        let state = ProjectState {
            status: ProjectStatus::Starting,
            emergency: false,
            demo: true,
            ..monitoring()
        };
        let score = compute_health_at(&healthy(), Some(&state), now());
        assert_eq!(score.components.project_state_health, 70.0);
    }

    #[test]
    fn fatal_pid_is_reported_and_not_running() {
        let mut managers = healthy();
        managers[2].pid = Some(FATAL_PID);
        managers[2].running_state = Some(RunningState::Stopped);

        let score = compute_health_at(&managers, Some(&monitoring()), now());
        assert!(score
            .issues
            .iter()
            .any(|i| i == "Manager WCCOActrl has a fatal startup error"));
        // 100 - 50 * 1/4 - 15
        assert_eq!(score.components.manager_health, 72.5);

        // a plain stopped manager is not fatal
        let mut managers = healthy();
        managers[2].running_state = Some(RunningState::Stopped);
        managers[2].pid = None;
        let score = compute_health_at(&managers, Some(&monitoring()), now());
        assert!(!score.issues.iter().any(|i| i.contains("fatal")));
        assert_eq!(score.components.manager_health, 87.5);
    }

    #[test]
    fn blocking_managers_never_raises_the_score() {
        let state = monitoring();
        let mut managers = healthy();
        let mut previous = compute_health_at(&managers, Some(&state), now()).overall_score;

        for i in 0..managers.len() {
            managers[i].running_state = Some(RunningState::Blocked);
            let score = compute_health_at(&managers, Some(&state), now()).overall_score;
            assert!(score <= previous, "{} > {} after blocking {}", score, previous, i);
            previous = score;
        }
    }

    #[test]
    fn many_initializing_managers_cost_points() {
        let mut managers = healthy();
        managers[0].running_state = Some(RunningState::Init);
        managers[1].running_state = Some(RunningState::Init);
        let score = compute_health_at(&managers, Some(&monitoring()), now());
        // nothing "not running", but no full-running bonus and the init penalty
        assert_eq!(score.components.manager_health, 95.0);
    }

    #[test]
    fn performance_deductions() {
        let mut managers = healthy();
        for m in managers.iter_mut().take(3) {
            m.sec_kill = -1;
        }
        managers[0].restart_count = 10;
        managers[1].restart_count = 6;
        managers[2].start_mode = StartMode::Manual;
        managers[3].start_mode = StartMode::Manual;
        managers[1].start_mode = StartMode::Once;

        let score = compute_health_at(&managers, Some(&monitoring()), now());
        // -10 secKill, -5 * 2 restarts, -5 manual > always
        assert_eq!(score.components.performance_health, 75.0);
    }

    #[test]
    fn mass_restart_heuristic() {
        let mut managers = healthy();
        for m in managers.iter_mut().take(3) {
            m.start_time = Some(now() - Duration::minutes(2));
        }
        let score = compute_health_at(&managers, Some(&monitoring()), now());
        assert_eq!(score.components.performance_health, 90.0);

        // two managers are not enough to call it a mass restart
        let few: Vec<Manager> = managers.into_iter().take(2).collect();
        let score = compute_health_at(&few, Some(&monitoring()), now());
        assert_eq!(score.components.performance_health, 100.0);
    }

    #[test]
    fn reliability_critical_and_ui() {
        let mut managers = healthy();
        managers[1].running_state = Some(RunningState::Stopped);
        managers[3].running_state = Some(RunningState::Stopped);

        let score = compute_health_at(&managers, Some(&monitoring()), now());
        // -20 for one of two critical, -15 no UI running, +5 uptime bonus
        assert_eq!(score.components.reliability_health, 70.0);
        assert!(score
            .issues
            .iter()
            .any(|i| i == "Critical managers not running: WCCILdata"));
    }

    #[test]
    fn uptime_bonus_needs_monitoring() {
        let mut managers = healthy();
        managers[3].running_state = Some(RunningState::Stopped);
        let with_monitoring = compute_health_at(&managers, Some(&monitoring()), now());
        assert_eq!(with_monitoring.components.reliability_health, 90.0);

        let starting = ProjectState {
            status: ProjectStatus::Starting,
            ..monitoring()
        };
        let without = compute_health_at(&managers, Some(&starting), now());
        assert_eq!(without.components.reliability_health, 85.0);
    }
}

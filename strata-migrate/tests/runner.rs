//! End-to-end engine tests against a scripted in-memory client.

use std::sync::Mutex;

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use strata_migrate::{
    ContinuationPolicy, HistoryTable, Migration, MigrationRunner, Outcome, Probe, RunnerConfig,
    SqlExecutor, StatementError,
};

/// What kind of client call was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    Execute,
    Batch,
    Params,
    Query,
}

#[derive(Debug, Clone)]
struct Call {
    kind: CallKind,
    sql: String,
}

/// A failure rule: statements containing `fragment` fail with `error`.
struct Rule {
    fragment: String,
    error: StatementError,
}

/// In-memory `SqlExecutor` that records every call and fails on demand.
#[derive(Default)]
struct ScriptedClient {
    calls: Mutex<Vec<Call>>,
    rules: Mutex<Vec<Rule>>,
    bool_results: Mutex<Vec<bool>>,
}

impl ScriptedClient {
    fn new() -> Self {
        Self::default()
    }

    fn fail_always(&self, fragment: &str, error: StatementError) {
        self.rules.lock().unwrap().push(Rule {
            fragment: fragment.to_string(),
            error,
        });
    }

    fn push_bool(&self, value: bool) {
        self.bool_results.lock().unwrap().push(value);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// SQL of every statement-bearing call, in order.
    fn sql_log(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.sql).collect()
    }

    fn record(&self, kind: CallKind, sql: &str) {
        self.calls.lock().unwrap().push(Call {
            kind,
            sql: sql.to_string(),
        });
    }

    fn check_rules(&self, sql: &str) -> Result<(), StatementError> {
        let rules = self.rules.lock().unwrap();
        for rule in rules.iter() {
            if sql.contains(&rule.fragment) {
                return Err(rule.error.clone());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SqlExecutor for ScriptedClient {
    async fn execute(&self, sql: &str) -> Result<(), StatementError> {
        self.record(CallKind::Execute, sql);
        self.check_rules(sql)
    }

    async fn batch_execute(&self, sql: &str) -> Result<(), StatementError> {
        self.record(CallKind::Batch, sql);
        self.check_rules(sql)
    }

    async fn execute_params(&self, sql: &str, _params: &[&str]) -> Result<u64, StatementError> {
        self.record(CallKind::Params, sql);
        self.check_rules(sql).map(|_| 1)
    }

    async fn query_bool(&self, sql: &str, _params: &[&str]) -> Result<bool, StatementError> {
        self.record(CallKind::Query, sql);
        self.check_rules(sql)?;
        Ok(self.bool_results.lock().unwrap().pop().unwrap_or(true))
    }
}

fn duplicate_column() -> StatementError {
    StatementError::execution("column \"age\" of relation \"users\" already exists")
        .with_sqlstate("42701")
}

fn duplicate_constraint() -> StatementError {
    StatementError::execution("constraint \"fk_orders_user\" already exists").with_sqlstate("42710")
}

fn syntax_error() -> StatementError {
    StatementError::execution("syntax error at or near \"CREAT\"").with_sqlstate("42601")
}

fn outcomes(report: &strata_migrate::RunReport) -> Vec<Outcome> {
    report.migrations.iter().map(|m| m.outcome).collect()
}

// Scenario: rerunning a migration whose statements all carry IF NOT EXISTS
// guards never produces a failure.
#[tokio::test]
async fn rerun_of_guarded_ddl_stays_successful() {
    let client = ScriptedClient::new();
    let migrations = vec![Migration::inline(
        "0001_add_age",
        "ALTER TABLE users ADD COLUMN IF NOT EXISTS age INT; \
         ALTER TABLE users ADD COLUMN IF NOT EXISTS age INT;",
    )];
    let runner = MigrationRunner::new(&client);

    let first = runner.run(&migrations).await.unwrap();
    let second = runner.run(&migrations).await.unwrap();

    assert_eq!(outcomes(&first), vec![Outcome::Applied]);
    assert_eq!(outcomes(&second), vec![Outcome::Applied]);
    assert!(first.succeeded() && second.succeeded());
}

// Scenario: ADD CONSTRAINT has no IF NOT EXISTS form; the second run errors
// with duplicate_object and the guard turns it into AlreadyApplied.
#[tokio::test]
async fn constraint_rerun_is_already_applied() {
    let client = ScriptedClient::new();
    let migrations = vec![Migration::inline(
        "0002_fk",
        "ALTER TABLE orders ADD CONSTRAINT fk_orders_user FOREIGN KEY (user_id) REFERENCES users (id);",
    )];
    let runner = MigrationRunner::new(&client);

    let first = runner.run(&migrations).await.unwrap();
    assert_eq!(outcomes(&first), vec![Outcome::Applied]);

    client.fail_always("ADD CONSTRAINT", duplicate_constraint());
    let second = runner.run(&migrations).await.unwrap();
    assert_eq!(outcomes(&second), vec![Outcome::AlreadyApplied]);
    assert!(second.succeeded());
}

// Scenario: a genuine failure in the middle halts the list; later migrations
// never reach the database.
#[tokio::test]
async fn stop_on_failure_skips_the_rest() {
    let client = ScriptedClient::new();
    client.fail_always("CREAT TABLE", syntax_error());

    let migrations = vec![
        Migration::inline("0001_a", "CREATE TABLE a (id INT);"),
        Migration::inline("0002_broken", "CREAT TABLE b (id INT);"),
        Migration::inline("0003_c", "CREATE TABLE c (id INT);"),
    ];
    let report = MigrationRunner::new(&client).run(&migrations).await.unwrap();

    assert_eq!(
        outcomes(&report),
        vec![Outcome::Applied, Outcome::Failed, Outcome::Skipped]
    );
    assert!(!report.succeeded());
    assert!(report.migrations[1].message.as_deref().unwrap().contains("syntax error"));
    assert!(!client.sql_log().iter().any(|s| s.contains("TABLE c")));
}

// Scenario: a batch migration with semicolons inside a procedural block is
// submitted whole; one failure yields one Failed outcome.
#[tokio::test]
async fn batch_mode_bypasses_the_splitter() {
    let sql = "DO $$ BEGIN \
               ALTER TABLE users ADD COLUMN age INT; \
               EXCEPTION WHEN duplicate_column THEN NULL; \
               END $$;";
    let client = ScriptedClient::new();
    let migrations = vec![Migration::inline("0004_guarded", sql).batch()];

    let report = MigrationRunner::new(&client).run(&migrations).await.unwrap();
    assert_eq!(outcomes(&report), vec![Outcome::Applied]);

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].kind, CallKind::Batch);
    assert_eq!(calls[0].sql, sql);

    // Any batch failure is genuine, even one that looks benign.
    let client = ScriptedClient::new();
    client.fail_always("DO $$", duplicate_column());
    let report = MigrationRunner::new(&client).run(&migrations).await.unwrap();
    assert_eq!(outcomes(&report), vec![Outcome::Failed]);
}

#[tokio::test]
async fn statements_run_in_declared_order() {
    let client = ScriptedClient::new();
    let migrations = vec![
        Migration::inline("0001", "CREATE TABLE a (id INT); CREATE INDEX ia ON a (id);"),
        Migration::inline("0002", "CREATE TABLE b (id INT);"),
    ];
    MigrationRunner::new(&client).run(&migrations).await.unwrap();

    assert_eq!(
        client.sql_log(),
        vec![
            "CREATE TABLE a (id INT)",
            "CREATE INDEX ia ON a (id)",
            "CREATE TABLE b (id INT)",
        ]
    );
}

#[tokio::test]
async fn continue_and_collect_attempts_everything() {
    let client = ScriptedClient::new();
    client.fail_always("CREAT TABLE", syntax_error());

    let migrations = vec![
        Migration::inline("0001_a", "CREATE TABLE a (id INT);"),
        Migration::inline("0002_broken", "CREAT TABLE b (id INT);"),
        Migration::inline("0003_c", "CREATE TABLE c (id INT);"),
    ];
    let config = RunnerConfig::new().policy(ContinuationPolicy::ContinueAndCollect);
    let report = MigrationRunner::new(&client)
        .with_config(config)
        .run(&migrations)
        .await
        .unwrap();

    assert_eq!(
        outcomes(&report),
        vec![Outcome::Applied, Outcome::Failed, Outcome::Applied]
    );
    assert!(!report.succeeded());
}

// A mix of effective and benign statements is Applied, not AlreadyApplied.
#[tokio::test]
async fn partial_benign_counts_as_applied() {
    let client = ScriptedClient::new();
    client.fail_always("ADD COLUMN age", duplicate_column());

    let migrations = vec![Migration::inline(
        "0005_mixed",
        "ALTER TABLE users ADD COLUMN age INT; \
         ALTER TABLE users ADD COLUMN email TEXT;",
    )];
    let report = MigrationRunner::new(&client).run(&migrations).await.unwrap();
    assert_eq!(outcomes(&report), vec![Outcome::Applied]);
}

// Losing the connection terminates the run even under continue-and-collect.
#[tokio::test]
async fn connection_loss_ends_the_run() {
    let client = ScriptedClient::new();
    client.fail_always(
        "TABLE a",
        StatementError::connection_lost("server closed the connection unexpectedly"),
    );

    let migrations = vec![
        Migration::inline("0001_a", "CREATE TABLE a (id INT);"),
        Migration::inline("0002_b", "CREATE TABLE b (id INT);"),
    ];
    let config = RunnerConfig::new().policy(ContinuationPolicy::ContinueAndCollect);
    let report = MigrationRunner::new(&client)
        .with_config(config)
        .run(&migrations)
        .await
        .unwrap();

    assert_eq!(outcomes(&report), vec![Outcome::Failed, Outcome::Skipped]);
    assert!(report.migrations[1]
        .message
        .as_deref()
        .unwrap()
        .contains("connection lost"));
    assert!(!client.sql_log().iter().any(|s| s.contains("TABLE b")));
}

// A missing source file fails that migration only; others still run under
// continue-and-collect.
#[tokio::test]
async fn missing_source_fails_only_its_migration() {
    let client = ScriptedClient::new();
    let migrations = vec![
        Migration::from_file("0001_missing", "/no/such/file.sql"),
        Migration::inline("0002_b", "CREATE TABLE b (id INT);"),
    ];
    let config = RunnerConfig::new().policy(ContinuationPolicy::ContinueAndCollect);
    let report = MigrationRunner::new(&client)
        .with_config(config)
        .run(&migrations)
        .await
        .unwrap();

    assert_eq!(outcomes(&report), vec![Outcome::Failed, Outcome::Applied]);
    assert!(report.migrations[0]
        .message
        .as_deref()
        .unwrap()
        .contains("not found"));
}

// Transactional split mode wraps each statement in a savepoint and rolls back
// to it on a benign failure, so the transaction itself survives.
#[tokio::test]
async fn transactional_split_uses_savepoints() {
    let client = ScriptedClient::new();
    client.fail_always("ADD COLUMN age", duplicate_column());

    let migrations = vec![Migration::inline(
        "0006_tx",
        "ALTER TABLE users ADD COLUMN age INT; CREATE INDEX iu ON users (age);",
    )];
    let config = RunnerConfig::new().transactional(true);
    let report = MigrationRunner::new(&client)
        .with_config(config)
        .run(&migrations)
        .await
        .unwrap();

    assert_eq!(outcomes(&report), vec![Outcome::Applied]);
    let log = client.sql_log();
    assert_eq!(log.first().map(String::as_str), Some("BEGIN"));
    assert_eq!(log.last().map(String::as_str), Some("COMMIT"));
    assert!(log.iter().any(|s| s == "ROLLBACK TO SAVEPOINT strata_stmt"));
    assert!(!log.iter().any(|s| s == "ROLLBACK"));
}

// A genuine failure inside a transactional migration rolls the whole
// migration back.
#[tokio::test]
async fn transactional_genuine_failure_rolls_back() {
    let client = ScriptedClient::new();
    client.fail_always("CREAT INDEX", syntax_error());

    let migrations = vec![Migration::inline(
        "0007_tx_fail",
        "CREATE TABLE t (id INT); CREAT INDEX it ON t (id);",
    )];
    let config = RunnerConfig::new().transactional(true);
    let report = MigrationRunner::new(&client)
        .with_config(config)
        .run(&migrations)
        .await
        .unwrap();

    assert_eq!(outcomes(&report), vec![Outcome::Failed]);
    assert_eq!(client.sql_log().last().map(String::as_str), Some("ROLLBACK"));
}

#[tokio::test]
async fn history_records_applied_migrations() {
    let client = ScriptedClient::new();
    let migrations = vec![Migration::inline("0001_a", "CREATE TABLE a (id INT);")];
    let config = RunnerConfig::new().with_history(HistoryTable::default());

    let report = MigrationRunner::new(&client)
        .with_config(config)
        .run(&migrations)
        .await
        .unwrap();
    assert!(report.succeeded());

    let calls = client.calls();
    assert!(calls
        .iter()
        .any(|c| c.kind == CallKind::Execute && c.sql.contains("CREATE TABLE IF NOT EXISTS \"_strata_history\"")));
    assert!(calls
        .iter()
        .any(|c| c.kind == CallKind::Params && c.sql.contains("INSERT INTO \"_strata_history\"")));
}

#[tokio::test]
async fn probes_report_end_state() {
    let client = ScriptedClient::new();
    client.push_bool(false);
    client.push_bool(true);

    assert!(Probe::table_exists("users").check(&client).await.unwrap());
    assert!(!Probe::column_exists("users", "age")
        .check(&client)
        .await
        .unwrap());

    let calls = client.calls();
    assert!(calls.iter().all(|c| c.kind == CallKind::Query));
}

use std::sync::Arc;

use opinit_config::SubmitterConfig;
use opinit_executor_client::ExecutorClient;
use opinit_l1client::{ChainGateway, InclusionRecord, TxId};
use opinit_primitives::output::OutputRecord;
use tracing::*;

use crate::{
    error::SubmitterError,
    handle::SubmitterHandle,
    state::{SubmitterPhase, SubmitterState},
};

/// Outcome of one pass of the loop.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Iteration {
    /// L1 does not expect anything newer than what we already synced.
    Skipped { next: u64, synced: u64 },
    /// The executor has not computed the expected output yet.
    Waiting { height: u64 },
    /// The output for `height` was proposed and included.
    Submitted { height: u64, txid: TxId },
    /// A fatal error stopped the submitter, or it had been stopped already.
    Stopped,
}

/// Proposes L2 outputs to L1, one height at a time.
pub struct OutputSubmitter<G, E> {
    gateway: Arc<G>,
    executor: Arc<E>,
    config: SubmitterConfig,
    state: SubmitterState,
    /// Error that stopped the loop, if it did not stop through the handle.
    fault: Option<SubmitterError>,
    handle: SubmitterHandle,
}

impl<G: ChainGateway, E: ExecutorClient> OutputSubmitter<G, E> {
    pub fn new(gateway: Arc<G>, executor: Arc<E>, config: SubmitterConfig) -> Self {
        let state = SubmitterState::default();
        let handle = SubmitterHandle::new(state.status(true));

        Self {
            gateway,
            executor,
            config,
            state,
            fault: None,
            handle,
        }
    }

    /// Starts from `synced_height` instead of genesis.
    pub fn with_synced_height(mut self, synced_height: u64) -> Self {
        self.state = SubmitterState::new(synced_height);
        self.publish_status();
        self
    }

    pub fn name(&self) -> &'static str {
        "output_submitter"
    }

    pub fn handle(&self) -> SubmitterHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> &SubmitterState {
        &self.state
    }

    /// The error that stopped the submitter, if any.
    pub fn fault(&self) -> Option<&SubmitterError> {
        self.fault.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    pub fn stop(&self) {
        self.handle.stop();
    }

    fn publish_status(&self) {
        self.handle.publish(self.state.status(self.is_running()));
    }

    fn set_phase(&mut self, phase: SubmitterPhase) {
        self.state.set_phase(phase);
        trace!(%phase, "submitter phase");
        self.publish_status();
    }

    /// Runs the loop until stopped, waiting the poll interval after every
    /// iteration.
    ///
    /// Returns the final state when stopped through the handle, or the error
    /// that made the submitter stop itself.
    pub async fn run(mut self) -> Result<SubmitterState, SubmitterError> {
        info!(synced_height = %self.state.synced_height(), "starting output submitter");

        while self.is_running() {
            self.tick().await;
            tokio::time::sleep(self.config.poll_interval()).await;
        }

        self.set_phase(SubmitterPhase::Stopped);
        info!(synced_height = %self.state.synced_height(), "output submitter stopped");

        match self.fault {
            Some(err) => Err(err),
            None => Ok(self.state),
        }
    }

    /// One pass of the loop. Fatal errors stop the submitter here.
    pub async fn tick(&mut self) -> Iteration {
        if !self.is_running() {
            return Iteration::Stopped;
        }

        match self.process_next().await {
            Ok(it) => {
                self.set_phase(SubmitterPhase::Idle);
                it
            }
            Err(err) => {
                error!(%err, kind = %err.kind(), synced_height = %self.state.synced_height(), "stopping output submitter");
                self.fault = Some(err);
                self.handle.stop();
                self.set_phase(SubmitterPhase::Stopped);
                Iteration::Stopped
            }
        }
    }

    async fn process_next(&mut self) -> Result<Iteration, SubmitterError> {
        self.set_phase(SubmitterPhase::Polling);
        let next = self.gateway.next_expected_height().await?;
        let synced = self.state.synced_height();
        if next <= synced {
            debug!(%next, %synced, "nothing new to propose");
            return Ok(Iteration::Skipped { next, synced });
        }

        self.set_phase(SubmitterPhase::Fetching);
        let output = match self.executor.fetch_output(next).await {
            Ok(output) => output,
            Err(err) => {
                let err = SubmitterError::from(err);
                if !err.is_recoverable() {
                    return Err(err);
                }
                info!(height = %next, "waiting for next output");
                return Ok(Iteration::Waiting { height: next });
            }
        };

        let txid = self.propose(&output, next).await?;
        let incl = self.confirm(&txid).await?;

        self.state.mark_synced(next, txid.clone());
        self.publish_status();
        info!(
            height = %next,
            output_root = %output.output_root,
            %txid,
            l1_height = %incl.height,
            "output submitted"
        );

        Ok(Iteration::Submitted { height: next, txid })
    }

    async fn propose(&mut self, output: &OutputRecord, height: u64) -> Result<TxId, SubmitterError> {
        self.set_phase(SubmitterPhase::Submitting);
        let output_root = output.output_root_bytes()?;

        info!(%height, output_root = %output.output_root, output_index = ?output.output_index, "proposing output");
        let txid = self
            .gateway
            .submit_output_proposal(&output_root, height)
            .await?;
        info!(%height, %txid, "output proposal broadcast");

        Ok(txid)
    }

    async fn confirm(&mut self, txid: &TxId) -> Result<InclusionRecord, SubmitterError> {
        self.set_phase(SubmitterPhase::Confirming);
        let timeout = self.config.inclusion_timeout();
        debug!(%txid, ?timeout, "waiting for inclusion");

        Ok(self.gateway.await_inclusion(txid, timeout).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use mockall::{mock, predicate::eq, Sequence};
    use opinit_executor_client::{ExecutorError, ExecutorResult};
    use opinit_l1client::{GatewayError, GatewayResult};

    use super::*;

    mock! {
        pub Gateway {}

        #[async_trait]
        impl ChainGateway for Gateway {
            async fn next_expected_height(&self) -> GatewayResult<u64>;
            async fn submit_output_proposal(&self, output_root: &[u8], height: u64) -> GatewayResult<TxId>;
            async fn await_inclusion(&self, txid: &TxId, timeout: Duration) -> GatewayResult<InclusionRecord>;
        }
    }

    mock! {
        pub Executor {}

        #[async_trait]
        impl ExecutorClient for Executor {
            async fn fetch_output(&self, height: u64) -> ExecutorResult<OutputRecord>;
        }
    }

    fn included(txid: &TxId) -> GatewayResult<InclusionRecord> {
        Ok(InclusionRecord {
            txid: txid.clone(),
            height: 1000,
            gas_used: 1,
        })
    }

    fn submitter(
        gateway: MockGateway,
        executor: MockExecutor,
        synced: u64,
    ) -> OutputSubmitter<MockGateway, MockExecutor> {
        OutputSubmitter::new(
            Arc::new(gateway),
            Arc::new(executor),
            SubmitterConfig::default(),
        )
        .with_synced_height(synced)
    }

    #[tokio::test]
    async fn test_submits_next_output() {
        let root = "aa".repeat(32);

        let mut gateway = MockGateway::new();
        gateway.expect_next_expected_height().returning(|| Ok(5));
        gateway
            .expect_submit_output_proposal()
            .withf(|output_root, height| output_root.to_vec() == vec![0xaa; 32] && *height == 5)
            .times(1)
            .returning(|_, _| Ok(TxId::new("F00D")));
        gateway
            .expect_await_inclusion()
            .withf(|txid, timeout| txid.as_str() == "F00D" && *timeout == Duration::from_secs(60))
            .times(1)
            .returning(|txid, _| included(txid));

        let mut executor = MockExecutor::new();
        let record = OutputRecord::new(root, 5);
        executor
            .expect_fetch_output()
            .with(eq(5))
            .times(1)
            .returning(move |_| Ok(record.clone()));

        let mut sub = submitter(gateway, executor, 4);
        let it = sub.tick().await;

        assert_eq!(it, Iteration::Submitted {
            height: 5,
            txid: TxId::new("F00D"),
        });
        assert_eq!(sub.state().synced_height(), 5);
        assert_eq!(sub.state().last_txid().map(|t| t.as_str()), Some("F00D"));
        assert_eq!(sub.state().phase(), SubmitterPhase::Idle);
        assert!(sub.is_running());
    }

    #[tokio::test]
    async fn test_skips_when_already_synced() {
        let mut gateway = MockGateway::new();
        gateway.expect_next_expected_height().returning(|| Ok(4));
        gateway.expect_submit_output_proposal().never();
        gateway.expect_await_inclusion().never();

        let mut executor = MockExecutor::new();
        executor.expect_fetch_output().never();

        let mut sub = submitter(gateway, executor, 4);
        let it = sub.tick().await;

        assert_eq!(it, Iteration::Skipped { next: 4, synced: 4 });
        assert_eq!(sub.state().synced_height(), 4);
        assert!(sub.is_running());
    }

    #[tokio::test]
    async fn test_waits_when_output_not_found() {
        let mut gateway = MockGateway::new();
        gateway.expect_next_expected_height().returning(|| Ok(5));
        gateway.expect_submit_output_proposal().never();

        let mut executor = MockExecutor::new();
        executor
            .expect_fetch_output()
            .returning(|height| Err(ExecutorError::NotFound { height }));

        let mut sub = submitter(gateway, executor, 4);
        assert_eq!(sub.tick().await, Iteration::Waiting { height: 5 });
        assert_eq!(sub.tick().await, Iteration::Waiting { height: 5 });

        assert!(sub.is_running());
        assert_eq!(sub.state().synced_height(), 4);
    }

    #[tokio::test]
    async fn test_stops_on_executor_transport_error() {
        let mut gateway = MockGateway::new();
        gateway.expect_next_expected_height().times(1).returning(|| Ok(5));
        gateway.expect_submit_output_proposal().never();

        let mut executor = MockExecutor::new();
        executor
            .expect_fetch_output()
            .times(1)
            .returning(|_| Err(ExecutorError::Transport("connection refused".into())));

        let mut sub = submitter(gateway, executor, 4);
        assert_eq!(sub.tick().await, Iteration::Stopped);
        assert!(!sub.is_running());
        assert_eq!(sub.state().phase(), SubmitterPhase::Stopped);
        assert!(matches!(
            sub.fault(),
            Some(SubmitterError::Executor(ExecutorError::Transport(_)))
        ));

        // further ticks don't touch the clients
        assert_eq!(sub.tick().await, Iteration::Stopped);
    }

    #[tokio::test]
    async fn test_stops_on_inclusion_timeout() {
        let mut gateway = MockGateway::new();
        gateway.expect_next_expected_height().returning(|| Ok(5));
        gateway
            .expect_submit_output_proposal()
            .times(1)
            .returning(|_, _| Ok(TxId::new("F00D")));
        gateway
            .expect_await_inclusion()
            .times(1)
            .returning(|txid, waited| {
                Err(GatewayError::Timeout {
                    txid: txid.clone(),
                    waited,
                })
            });

        let mut executor = MockExecutor::new();
        executor
            .expect_fetch_output()
            .returning(|h| Ok(OutputRecord::new("bb".repeat(32), h)));

        let mut sub = submitter(gateway, executor, 4);
        assert_eq!(sub.tick().await, Iteration::Stopped);
        assert_eq!(sub.state().synced_height(), 4);
        assert!(!sub.is_running());
        assert!(sub.state().last_txid().is_none());
    }

    #[tokio::test]
    async fn test_stops_on_bad_output_root() {
        let mut gateway = MockGateway::new();
        gateway.expect_next_expected_height().returning(|| Ok(5));
        gateway.expect_submit_output_proposal().never();

        let mut executor = MockExecutor::new();
        executor
            .expect_fetch_output()
            .returning(|h| Ok(OutputRecord::new("not hex", h)));

        let mut sub = submitter(gateway, executor, 4);
        assert_eq!(sub.tick().await, Iteration::Stopped);
        assert!(!sub.is_running());
    }

    #[tokio::test]
    async fn test_stops_on_height_query_error() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_next_expected_height()
            .returning(|| Err(GatewayError::Transport("eof".into())));

        let mut executor = MockExecutor::new();
        executor.expect_fetch_output().never();

        let mut sub = submitter(gateway, executor, 0);
        assert_eq!(sub.tick().await, Iteration::Stopped);
        assert!(!sub.is_running());
    }

    #[tokio::test]
    async fn test_synced_height_follows_l1() {
        let mut seq = Sequence::new();
        let mut gateway = MockGateway::new();
        for next in [1, 2, 2, 3] {
            gateway
                .expect_next_expected_height()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move || Ok(next));
        }
        gateway
            .expect_submit_output_proposal()
            .times(3)
            .returning(|_, h| Ok(TxId::new(format!("TX{h}"))));
        gateway
            .expect_await_inclusion()
            .times(3)
            .returning(|txid, _| included(txid));

        let mut executor = MockExecutor::new();
        executor
            .expect_fetch_output()
            .times(3)
            .returning(|h| Ok(OutputRecord::new("cc".repeat(32), h)));

        let mut sub = submitter(gateway, executor, 0);
        let mut heights = Vec::new();
        for _ in 0..4 {
            sub.tick().await;
            heights.push(sub.state().synced_height());
        }

        assert_eq!(heights, vec![1, 2, 2, 3]);
        assert_eq!(sub.state().last_txid().map(|t| t.as_str()), Some("TX3"));
    }

    #[tokio::test]
    async fn test_run_exits_after_stop() {
        let mut gateway = MockGateway::new();
        gateway.expect_next_expected_height().never();
        let mut executor = MockExecutor::new();
        executor.expect_fetch_output().never();

        let sub = submitter(gateway, executor, 7);
        let handle = sub.handle();
        handle.stop();

        let state = sub.run().await.unwrap();
        assert_eq!(state.synced_height(), 7);
        assert_eq!(state.phase(), SubmitterPhase::Stopped);
        assert!(!handle.is_running());
        assert_eq!(handle.status().phase, SubmitterPhase::Stopped);
    }

    /// Spawns the loop, lets it run for `window` of paused time, then stops it.
    async fn run_for(
        sub: OutputSubmitter<MockGateway, MockExecutor>,
        window: Duration,
    ) -> SubmitterState {
        let handle = sub.handle();
        let task = tokio::spawn(sub.run());

        tokio::time::sleep(window).await;
        assert!(handle.is_running());
        handle.stop();

        task.await.unwrap().unwrap()
    }

    // With the default one second interval, a 2.5s window fits iterations at
    // t=0, 1 and 2. The stop is seen at t=3.

    #[tokio::test(start_paused = true)]
    async fn test_run_waits_poll_interval_while_output_missing() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_next_expected_height()
            .times(3)
            .returning(|| Ok(1));
        let mut executor = MockExecutor::new();
        executor
            .expect_fetch_output()
            .times(3)
            .returning(|height| Err(ExecutorError::NotFound { height }));

        let state = run_for(submitter(gateway, executor, 0), Duration::from_millis(2_500)).await;
        assert_eq!(state.synced_height(), 0);
        assert_eq!(state.phase(), SubmitterPhase::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_waits_poll_interval_after_skip() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_next_expected_height()
            .times(3)
            .returning(|| Ok(4));
        gateway.expect_submit_output_proposal().never();
        let mut executor = MockExecutor::new();
        executor.expect_fetch_output().never();

        let state = run_for(submitter(gateway, executor, 4), Duration::from_millis(2_500)).await;
        assert_eq!(state.synced_height(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_waits_poll_interval_after_submit() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_next_expected_height()
            .times(3)
            .returning(|| Ok(5));
        gateway
            .expect_submit_output_proposal()
            .times(1)
            .returning(|_, _| Ok(TxId::new("F00D")));
        gateway
            .expect_await_inclusion()
            .times(1)
            .returning(|txid, _| included(txid));
        let mut executor = MockExecutor::new();
        executor
            .expect_fetch_output()
            .with(eq(5))
            .times(1)
            .returning(|h| Ok(OutputRecord::new("dd".repeat(32), h)));

        // submitted at t=0, skipped at t=1 and t=2
        let state = run_for(submitter(gateway, executor, 4), Duration::from_millis(2_500)).await;
        assert_eq!(state.synced_height(), 5);
        assert_eq!(state.last_txid().map(|t| t.as_str()), Some("F00D"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_itself_on_fatal_error() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_next_expected_height()
            .times(1)
            .returning(|| Ok(3));
        let mut executor = MockExecutor::new();
        executor
            .expect_fetch_output()
            .times(1)
            .returning(|_| {
                Err(ExecutorError::Service {
                    status: 500,
                    body: "boom".into(),
                })
            });

        let sub = submitter(gateway, executor, 2);
        let handle = sub.handle();
        let mut status_rx = handle.subscribe_status();

        let err = sub.run().await.unwrap_err();
        assert!(matches!(
            err,
            SubmitterError::Executor(ExecutorError::Service { status: 500, .. })
        ));
        assert_eq!(err.kind(), opinit_primitives::ErrorKind::ServiceError);
        assert!(!handle.is_running());

        let status = status_rx.borrow_and_update().clone();
        assert!(!status.running);
        assert_eq!(status.phase, SubmitterPhase::Stopped);
        assert_eq!(status.synced_height, 2);
    }

    #[tokio::test]
    async fn test_stop_shows_in_status_before_loop_exits() {
        let sub = submitter(MockGateway::new(), MockExecutor::new(), 1);
        let handle = sub.handle();
        sub.stop();

        assert!(!handle.status().running);
        assert_eq!(handle.status().phase, SubmitterPhase::Idle);
    }

    #[test]
    fn test_name() {
        let sub = submitter(MockGateway::new(), MockExecutor::new(), 0);
        assert_eq!(sub.name(), "output_submitter");
        assert_eq!(sub.handle().status().synced_height, 0);
    }
}

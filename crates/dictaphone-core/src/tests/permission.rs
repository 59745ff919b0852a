use crate::{CoreError, CoreResult, PermissionDecision, PermissionSource, PermissionStatus, acquire};

/// Permission source answering from a fixed script.
struct ScriptedSource {
    query: PermissionStatus,
    request: PermissionStatus,
    requests_made: u32,
}

impl ScriptedSource {
    fn new(query: PermissionStatus, request: PermissionStatus) -> Self {
        Self {
            query,
            request,
            requests_made: 0,
        }
    }
}

#[async_trait::async_trait]
impl PermissionSource for ScriptedSource {
    async fn query(&mut self) -> CoreResult<PermissionStatus> {
        Ok(self.query)
    }

    async fn request(&mut self) -> CoreResult<PermissionStatus> {
        self.requests_made += 1;
        Ok(self.request)
    }
}

const GRANTED: PermissionStatus = PermissionStatus {
    granted: true,
    can_ask_again: true,
};
const ASKABLE: PermissionStatus = PermissionStatus {
    granted: false,
    can_ask_again: true,
};
const BLOCKED: PermissionStatus = PermissionStatus {
    granted: false,
    can_ask_again: false,
};

/// WHAT: Statuses classify into the three gate decisions
/// WHY: The whole flow branches on this classification
#[test]
fn given_statuses_when_classifying_then_expected_decisions() {
    // Given/When/Then: Each status maps to its decision
    assert_eq!(PermissionDecision::from(GRANTED), PermissionDecision::Granted);
    assert_eq!(PermissionDecision::from(ASKABLE), PermissionDecision::AskAgain);
    assert_eq!(PermissionDecision::from(BLOCKED), PermissionDecision::Blocked);
}

/// WHAT: A granted permission passes without prompting
/// WHY: Users who already granted access must not be re-prompted
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_granted_permission_when_acquiring_then_ok_without_request() {
    // Given: A source already granting access
    let mut source = ScriptedSource::new(GRANTED, GRANTED);

    // When: The gate runs
    let result = acquire(&mut source).await;

    // Then: Access is acquired and no request was made
    result.unwrap();
    assert_eq!(source.requests_made, 0);
}

/// WHAT: An undecided permission is requested and can succeed
/// WHY: First launch must prompt exactly once and proceed on consent
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_undecided_permission_when_request_granted_then_ok() {
    // Given: A source that grants when asked
    let mut source = ScriptedSource::new(ASKABLE, GRANTED);

    // When: The gate runs
    let result = acquire(&mut source).await;

    // Then: Access is acquired after one request
    result.unwrap();
    assert_eq!(source.requests_made, 1);
}

/// WHAT: A refused request is a terminal denial
/// WHY: The gate asks once; refusal must not loop into re-prompts
#[tokio::test]
async fn given_undecided_permission_when_request_refused_then_denied() {
    // Given: A source that refuses when asked
    let mut source = ScriptedSource::new(ASKABLE, BLOCKED);

    // When: The gate runs
    let result = acquire(&mut source).await;

    // Then: The denial is terminal and was asked exactly once
    assert!(matches!(result, Err(CoreError::PermissionDenied { .. })));
    assert_eq!(source.requests_made, 1);
}

/// WHAT: A blocked permission denies without prompting
/// WHY: Prompting when the platform forbids it would be a dead end
#[tokio::test]
async fn given_blocked_permission_when_acquiring_then_denied_without_request() {
    // Given: A source reporting a hard block
    let mut source = ScriptedSource::new(BLOCKED, GRANTED);

    // When: The gate runs
    let result = acquire(&mut source).await;

    // Then: The denial is terminal and nothing was requested
    assert!(matches!(result, Err(CoreError::PermissionDenied { .. })));
    assert_eq!(source.requests_made, 0);
}

/// WHAT: The terminal denial carries the settings instruction
/// WHY: The error screen tells users how to recover
#[tokio::test]
#[allow(clippy::panic)]
async fn given_denied_permission_when_acquiring_then_instruction_present() {
    // Given: A source reporting a hard block
    let mut source = ScriptedSource::new(BLOCKED, GRANTED);

    // When: The gate runs
    let result = acquire(&mut source).await;

    // Then: The error names the device settings
    match result {
        Err(CoreError::PermissionDenied { instruction, .. }) => {
            assert!(instruction.contains("device settings"));
        }
        other => panic!("expected PermissionDenied, got {:?}", other),
    }
}

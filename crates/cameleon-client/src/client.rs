//! The call dispatcher: per-operation methods, argument-list construction,
//! and mixed-result post-processing.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDateTime;
use tracing::debug;

use cameleon_protocol::protocol::constants::{BLANK, DEVICE, DONT_CARE, GROUP, IMMEDIATELY};
use cameleon_protocol::protocol::{
    CameleonError, CredentialStatus, CurrentMessage, EventTime, GlobalMessage, MessagePhase,
    MixedResult, Result, ScheduledMessage, SetMessageResponse, SignInfo, UpdateTime,
};
use cameleon_protocol::transport::TcpTransport;
use cameleon_protocol::xmlrpc::{FromValue, ToValue, Value, XmlRpcCodec};

// Remote method names. The wire method is an explicit constant per
// operation, never inferred from the calling function.
const SET_MESSAGE: &str = "SetMessage";
const GET_SIGN_IDS: &str = "GetSignIDs";
const GET_SCHEDULED_MESSAGES: &str = "GetScheduledMessages";
const CANCEL_SCHEDULED_MESSAGES: &str = "CancelScheduledMessages";
const EDIT_SCHEDULED_MESSAGES: &str = "EditScheduledMessages";
const GET_CURRENT_MESSAGES: &str = "GetCurrentMessages";
const GET_CURRENT_MESSAGE: &str = "GetCurrentMessage";
const VALIDATE_USERNAME_PASSWORD: &str = "ValidateUsernamePassword";
const GET_GLOBAL_MESSAGES: &str = "GetGlobalMessages";

/// Cameleon client for a single controller.
///
/// Holds only immutable configuration (address, optional deadline); every
/// call gets its own connection, so a shared client instance supports
/// concurrent calls without locking.
pub struct CameleonClient {
    addr: String,
    transport: TcpTransport,
    timeout: Option<Duration>,
}

impl CameleonClient {
    /// Create a client for the controller at `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            addr: format!("{}:{}", host.into(), port),
            transport: TcpTransport::new(),
            timeout: None,
        }
    }

    /// Apply a deadline to every call, covering the whole
    /// connect/send/receive sequence. Expiry yields
    /// [`CameleonError::Timeout`] and still closes the connection.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Update one or more signs, immediately or on a schedule.
    ///
    /// `recipients` entries must be `<type>_<id>` strings where `<type>` is
    /// `Device` or `Group` (case-sensitive); any other form fails with
    /// [`CameleonError::InvalidArgument`] before a connection is opened.
    ///
    /// The trailing `message_phases`/`end_time`/`activate_priority`/
    /// `run_priority` group is sent only when `message_name` names a real
    /// message (neither sentinel) and `message_phases` is supplied; the
    /// remote side distinguishes the 6-argument and 10-argument forms by
    /// arity. When the group is sent, all three companions of
    /// `message_phases` are required.
    #[allow(clippy::too_many_arguments)]
    pub async fn set_message(
        &self,
        recipients: &[String],
        update_time: UpdateTime,
        message_level: i32,
        username: &str,
        password: &str,
        message_name: &str,
        message_phases: Option<&[MessagePhase]>,
        end_time: Option<NaiveDateTime>,
        activate_priority: Option<i32>,
        run_priority: Option<i32>,
    ) -> Result<SetMessageResponse> {
        validate_recipients(recipients)?;
        let params = build_set_message_params(
            recipients,
            update_time,
            message_level,
            username,
            password,
            message_name,
            message_phases,
            end_time,
            activate_priority,
            run_priority,
        )?;
        self.call_typed(SET_MESSAGE, &params).await
    }

    /// [`set_message`](Self::set_message) with the immediate sentinel in
    /// the schedule slot.
    #[allow(clippy::too_many_arguments)]
    pub async fn set_message_immediately(
        &self,
        recipients: &[String],
        message_level: i32,
        username: &str,
        password: &str,
        message_name: &str,
        message_phases: Option<&[MessagePhase]>,
        end_time: Option<NaiveDateTime>,
        activate_priority: Option<i32>,
        run_priority: Option<i32>,
    ) -> Result<SetMessageResponse> {
        self.set_message(
            recipients,
            UpdateTime::Immediately,
            message_level,
            username,
            password,
            message_name,
            message_phases,
            end_time,
            activate_priority,
            run_priority,
        )
        .await
    }

    /// List all signs and sign groups the controller knows.
    pub async fn get_sign_ids(&self) -> Result<Vec<SignInfo>> {
        self.call_typed(GET_SIGN_IDS, &[]).await
    }

    /// List the messages in the schedule queue.
    pub async fn get_scheduled_messages(&self) -> Result<MixedResult<Vec<ScheduledMessage>>> {
        self.call_mixed(GET_SCHEDULED_MESSAGES, &[]).await
    }

    /// Cancel scheduled messages by their queue identifiers; returns the
    /// remaining queue.
    pub async fn cancel_scheduled_messages(
        &self,
        selected_messages: &[String],
    ) -> Result<MixedResult<Vec<ScheduledMessage>>> {
        let params = [selected_messages.to_value()];
        self.call_mixed(CANCEL_SCHEDULED_MESSAGES, &params).await
    }

    /// Reschedule messages in the queue. `new_end_time` of `None` leaves
    /// the end time untouched (the empty string on the wire).
    pub async fn edit_scheduled_messages(
        &self,
        selected_messages: &[String],
        new_update_time: &EventTime,
        new_end_time: Option<&EventTime>,
    ) -> Result<MixedResult<Vec<ScheduledMessage>>> {
        let params = [
            selected_messages.to_value(),
            new_update_time.to_value(),
            new_end_time
                .map(ToValue::to_value)
                .unwrap_or_else(|| Value::String(String::new())),
        ];
        self.call_mixed(EDIT_SCHEDULED_MESSAGES, &params).await
    }

    /// What every sign is currently showing, keyed by member names the
    /// controller chooses at runtime.
    pub async fn get_current_messages(&self) -> Result<BTreeMap<String, Value>> {
        self.call_typed(GET_CURRENT_MESSAGES, &[]).await
    }

    /// What one sign is currently showing.
    pub async fn get_current_message(&self, sign_id: i32) -> Result<CurrentMessage> {
        let params = [Value::Int(sign_id)];
        self.call_typed(GET_CURRENT_MESSAGE, &params).await
    }

    /// Check a username/password pair against the controller.
    pub async fn validate_username_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<CredentialStatus> {
        let params = [username.to_value(), password.to_value()];
        self.call_typed(VALIDATE_USERNAME_PASSWORD, &params).await
    }

    /// List the controller-wide broadcast messages.
    pub async fn get_global_messages(&self) -> Result<MixedResult<Vec<GlobalMessage>>> {
        self.call_mixed(GET_GLOBAL_MESSAGES, &[]).await
    }

    /// Encode, execute one exchange, decode.
    async fn call(&self, method: &str, params: &[Value]) -> Result<Value> {
        let request = XmlRpcCodec::encode_request(method, params)?;
        debug!(method, params = params.len(), "dispatching call");
        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.transport.execute(&self.addr, &request))
                .await
                .map_err(|_| CameleonError::Timeout(limit.as_millis() as u64))??,
            None => self.transport.execute(&self.addr, &request).await?,
        };
        XmlRpcCodec::decode_response(&response)
    }

    async fn call_typed<T: FromValue>(&self, method: &str, params: &[Value]) -> Result<T> {
        let value = self.call(method, params).await?;
        T::from_value(&value)
    }

    async fn call_mixed<T: FromValue>(
        &self,
        method: &str,
        params: &[Value],
    ) -> Result<MixedResult<T>> {
        let value = self.call(method, params).await?;
        MixedResult::from_value(&value)
    }
}

/// Check every recipient is `<type>_<id>` with a case-sensitive recipient
/// type token. A pure local precondition; no network I/O happens first.
fn validate_recipients(recipients: &[String]) -> Result<()> {
    for recipient in recipients {
        let parts: Vec<&str> = recipient.split('_').collect();
        if !(parts.len() == 2 && (parts[0] == DEVICE || parts[0] == GROUP)) {
            return Err(CameleonError::InvalidArgument(format!(
                "recipient `{recipient}` must be `<type>_<id>` where `<type>` is \
                 `{DEVICE}` for a sign or `{GROUP}` for a sign group (case-sensitive)"
            )));
        }
    }
    Ok(())
}

/// Build the positional argument list for `SetMessage`.
#[allow(clippy::too_many_arguments)]
fn build_set_message_params(
    recipients: &[String],
    update_time: UpdateTime,
    message_level: i32,
    username: &str,
    password: &str,
    message_name: &str,
    message_phases: Option<&[MessagePhase]>,
    end_time: Option<NaiveDateTime>,
    activate_priority: Option<i32>,
    run_priority: Option<i32>,
) -> Result<Vec<Value>> {
    let mut params: Vec<Value> = Vec::with_capacity(10);
    params.push(recipients.to_value());
    params.push(match update_time {
        UpdateTime::Immediately => Value::String(IMMEDIATELY.to_string()),
        UpdateTime::At(schedule) => schedule.to_value(),
    });
    params.push(message_level.to_value());
    params.push(username.to_value());
    params.push(password.to_value());
    params.push(message_name.to_value());

    // Sentinel names never carry the trailing group, whatever was passed.
    if message_name != DONT_CARE && message_name != BLANK {
        if let Some(phases) = message_phases {
            let end_time = end_time.ok_or_else(|| {
                CameleonError::InvalidArgument(
                    "end_time is required when message_phases are supplied".to_string(),
                )
            })?;
            let activate_priority = activate_priority.ok_or_else(|| {
                CameleonError::InvalidArgument(
                    "activate_priority is required when message_phases are supplied".to_string(),
                )
            })?;
            let run_priority = run_priority.ok_or_else(|| {
                CameleonError::InvalidArgument(
                    "run_priority is required when message_phases are supplied".to_string(),
                )
            })?;
            params.push(phases.to_value());
            params.push(end_time.to_value());
            params.push(activate_priority.to_value());
            params.push(run_priority.to_value());
        } else if end_time.is_some() || activate_priority.is_some() || run_priority.is_some() {
            return Err(CameleonError::InvalidArgument(
                "end_time, activate_priority and run_priority have no effect without \
                 message_phases"
                    .to_string(),
            ));
        }
    }
    Ok(params)
}

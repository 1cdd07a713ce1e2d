//! Sanitized message pools: a canned, per-violation
//! message for development mode and a small generic pool for production
//! mode, so a blocked caller can never distinguish *which* rule tripped.

use warden_proto::ViolationType;

/// Development-mode message: specific enough to debug against, never a
/// free-form internal reason.
#[must_use]
pub fn canned_message(violation: ViolationType) -> &'static str {
    use ViolationType::*;
    match violation {
        InvalidProtocol | InvalidMethod | InvalidSchema | MalformedMessage => {
            "The request did not match the expected protocol shape."
        }
        SizeLimitExceeded | StringLimitExceeded | ParamLimitExceeded => "The request exceeded a configured size limit.",
        DangerousEncoding | SuspiciousEncoding => "The request contained a disallowed encoding.",
        MissingRequiredParam | InvalidMcpMethod => "The request was missing a required parameter or used an unknown method.",
        PathTraversal => "The request referenced a path outside the allowed scope.",
        SsrfAttempt => "The request targeted a disallowed network destination.",
        XssAttempt | ScriptInjection | CssInjection => "The request contained a disallowed script payload.",
        SqlInjection | NosqlInjection | GraphqlInjection => "The request contained a disallowed query payload.",
        CommandInjection => "The request contained a disallowed shell payload.",
        BufferOverflowAttempt => "The request exceeded an internal safety bound.",
        DeserializationInjection | PrototypePollution => "The request contained a disallowed object structure.",
        XmlEntityAttack => "The request contained a disallowed XML construct.",
        CrlfInjection => "The request contained disallowed control sequences.",
        DangerousDataUri | Base64Injection | NestedDataUri => "The request contained a disallowed encoded payload.",
        SecretLeak => "The response contained content that could not be returned.",
        CsvInjection => "The request contained a disallowed spreadsheet formula payload.",
        RateLimitExceeded => "Too many requests. Please slow down and try again shortly.",
        BurstActivity => "Request burst detected. Please slow down and try again shortly.",
        OversizedMessage => "The request exceeded the message size limit.",
        AutomatedTiming | SuspiciousMethod => "The request pattern could not be accepted.",
        ToolNotAllowed => "The requested tool is not available.",
        InvalidToolArguments | ArgsEgressLimit | ArgSerializationError => "The tool arguments did not match the expected contract.",
        ToolEgressLimit => "The tool response would exceed the configured size limit.",
        SideEffectNotAllowed => "The requested tool requires a capability not granted to this session.",
        ResourcePolicyViolation => "The requested resource is not accessible.",
        ResourceEgressLimit => "The requested resource exceeds the configured size limit.",
        QuotaExceeded => "The request quota for this operation has been exceeded.",
        ChainViolation => "This operation may not follow the previous one in this session.",
        ValidationError | ValidatorError | InternalError | Unknown => "The request could not be validated.",
    }
}

const GENERIC_POOL: &[&str] = &[
    "Your request could not be processed.",
    "This request was not accepted.",
    "The request did not pass validation.",
    "Unable to complete this request.",
    "The server declined to process this request.",
];

/// Production-mode message: picked by a CSPRNG byte so repeated failures of
/// the same kind don't let a caller enumerate the rule catalog by message
/// text alone.
#[must_use]
pub fn generic_message(random_byte: u8) -> &'static str {
    GENERIC_POOL[usize::from(random_byte) % GENERIC_POOL.len()]
}

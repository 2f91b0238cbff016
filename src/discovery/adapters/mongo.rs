//! Document store discovery (`MongoDB`).

use super::conventions::{ConventionalDiscovery, SourceConventions};
use super::probe::{ProbeTarget, connect, exchange, seed_targets};
use super::rewrite::{apply_credentials, apply_path_parameter, has_any_parameter, parse_candidate};
use crate::discovery::{
    domain::{
        CandidateRewriteError, DiscoveryCandidate, DiscoveryContext, ServiceDescriptor,
        ServiceEndpoint, parameter_keys,
    },
    ports::{DiscoveryAdapter, DiscoverySources},
};
use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tracing::debug;

const DEFAULT_PORT: u16 = 27017;

const CONVENTIONS: SourceConventions = SourceConventions {
    environment_lists: &["MONGO_URLS", "MONGODB_URI"],
    configuration_lists: &["Mongo:Urls"],
    connection_string_keys: &["Mongo:ConnectionString", "MongoDb:ConnectionString"],
};

/// `OP_MSG` carrying `{ping: 1, $db: "admin"}` with request id 1.
const PING_OP_MSG: [u8; 51] = [
    // header: messageLength, requestID, responseTo, opCode (2013)
    51, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0xDD, 0x07, 0, 0, //
    // flagBits, section kind 0
    0, 0, 0, 0, 0, //
    // BSON document length
    30, 0, 0, 0, //
    // int32 "ping" = 1
    0x10, b'p', b'i', b'n', b'g', 0, 1, 0, 0, 0, //
    // string "$db" = "admin"
    0x02, b'$', b'd', b'b', 0, 6, 0, 0, 0, b'a', b'd', b'm', b'i', b'n', 0, //
    // document terminator
    0,
];

const OP_MSG_CODE: u32 = 2013;
const SRV_SCHEME: &str = "mongodb+srv://";
const HEADER_LEN: usize = 16;
/// `"ok": 1.0` encoded as a BSON double element.
const OK_DOUBLE: [u8; 12] = [0x01, b'o', b'k', 0, 0, 0, 0, 0, 0, 0, 0xF0, 0x3F];
/// `"ok": 1` encoded as a BSON int32 element.
const OK_INT32: [u8; 8] = [0x10, b'o', b'k', 0, 1, 0, 0, 0];

/// Discovery adapter for `MongoDB` document stores.
#[derive(Debug, Clone)]
pub struct MongoDiscoveryAdapter {
    descriptor: ServiceDescriptor,
    discovery: ConventionalDiscovery,
}

impl MongoDiscoveryAdapter {
    /// Creates the adapter with its default descriptor.
    #[must_use]
    pub fn new(sources: DiscoverySources) -> Self {
        Self {
            descriptor: Self::default_descriptor(),
            discovery: ConventionalDiscovery::new(sources, CONVENTIONS),
        }
    }

    /// Replaces the descriptor, for deployments using other host names.
    #[must_use]
    pub fn with_descriptor(mut self, descriptor: ServiceDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }

    /// Returns the descriptor registered by default.
    #[must_use]
    pub fn default_descriptor() -> ServiceDescriptor {
        ServiceDescriptor::new(
            "mongo",
            ServiceEndpoint::new("mongodb", "mongodb", DEFAULT_PORT),
            ServiceEndpoint::new("mongodb", "localhost", DEFAULT_PORT),
        )
        .with_aliases(["mongodb", "docstore"])
    }
}

#[async_trait]
impl DiscoveryAdapter for MongoDiscoveryAdapter {
    fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    fn read_explicit_configuration(&self) -> Option<String> {
        self.discovery.read_explicit(&self.descriptor)
    }

    fn build_candidates(
        &self,
        descriptor: &ServiceDescriptor,
        context: &DiscoveryContext,
    ) -> Vec<DiscoveryCandidate> {
        self.discovery.candidates(self, descriptor, context)
    }

    async fn validate_health(&self, url: &str, context: &DiscoveryContext) -> bool {
        if url.trim_start().starts_with(SRV_SCHEME) {
            debug!("mongo SRV seed lists need a DNS SRV lookup; not probed");
            return false;
        }

        let budget = context.health_check_timeout();
        for target in seed_targets(url, DEFAULT_PORT) {
            match ping(&target, budget).await {
                Ok(reply) if reply_reports_ok(&reply) => return true,
                Ok(_) => debug!(host = target.host(), "mongo seed answered without ok"),
                Err(err) => debug!(host = target.host(), %err, "mongo ping failed"),
            }
        }
        false
    }

    fn rewrite_url(
        &self,
        url: &str,
        context: &DiscoveryContext,
    ) -> Result<String, CandidateRewriteError> {
        let keys = [
            parameter_keys::USERNAME,
            parameter_keys::PASSWORD,
            parameter_keys::DATABASE,
        ];
        if !has_any_parameter(context, &keys) {
            return Ok(url.to_owned());
        }

        let mut parsed = parse_candidate(url)?;
        let has_credentials = apply_credentials(&mut parsed, context)?;
        apply_path_parameter(&mut parsed, context, parameter_keys::DATABASE);
        let has_auth_source = parsed.query_pairs().any(|(key, _)| key == "authSource");
        if has_credentials && !has_auth_source {
            parsed.query_pairs_mut().append_pair("authSource", "admin");
        }
        Ok(parsed.to_string())
    }
}

async fn ping(target: &ProbeTarget, budget: Duration) -> io::Result<Vec<u8>> {
    let mut stream = connect(target, budget).await?;
    exchange(&mut stream, &PING_OP_MSG, budget, reply_is_complete).await
}

fn declared_length(bytes: &[u8]) -> Option<usize> {
    let prefix = bytes.get(..4)?;
    let length = prefix
        .iter()
        .rev()
        .fold(0_u32, |acc, byte| (acc << 8) | u32::from(*byte));
    usize::try_from(length).ok()
}

fn reply_is_complete(bytes: &[u8]) -> bool {
    declared_length(bytes).is_some_and(|length| bytes.len() >= length)
}

fn reply_reports_ok(bytes: &[u8]) -> bool {
    let Some(length) = declared_length(bytes) else {
        return false;
    };
    let op_code = bytes
        .get(12..HEADER_LEN)
        .map(|code| {
            code.iter()
                .rev()
                .fold(0_u32, |acc, byte| (acc << 8) | u32::from(*byte))
        });
    if op_code != Some(OP_MSG_CODE) || length < HEADER_LEN {
        return false;
    }

    let Some(body) = bytes.get(HEADER_LEN..length) else {
        return false;
    };
    contains(body, &OK_DOUBLE) || contains(body, &OK_INT32)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

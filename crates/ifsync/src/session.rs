//! Live session plumbing: the `SessionFactory` the pipeline drivers
//! use to open one UDP session per target host.

use std::net::IpAddr;

use ifsync_core::SessionFactory;
use ifsync_snmp::{SnmpError, UdpSession};

use crate::config::SessionTemplate;

pub struct UdpFactory {
    template: SessionTemplate,
}

impl UdpFactory {
    pub fn new(template: SessionTemplate) -> Self {
        Self { template }
    }
}

impl SessionFactory for UdpFactory {
    type Session = UdpSession;

    async fn open(&self, host: IpAddr) -> Result<UdpSession, SnmpError> {
        UdpSession::connect(&self.template.for_host(host)).await
    }
}

// This file is part of the terraform-provider-ibm project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! In-memory fakes of the IBM Cloud services

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::api::findings::{ApiNote, ApiProvider};
use crate::api::power::{ApiPlacementGroup, ApiPlacementGroupCreate};
use crate::api::vpc::{
    ApiBareMetalServerDisk, ApiBareMetalServerDiskPatch, ApiIkePolicy, ApiIkePolicyPatch,
    ApiIkePolicyPrototype, ApiResourceGroupReference, ApiVpnConnectionReference,
};
use crate::api::{ApiError, ApiResult, FindingsApi, Page, PowerApi, TaggingApi, VpcApi};
use crate::session::{Session, SessionHandle};

pub const ACCOUNT_ID: &str = "acc-0001";
pub const TIMESTAMP: &str = "2024-05-01T10:00:00Z";

fn conflict(message: &str) -> ApiError {
    ApiError::Status {
        method: "POST".to_owned(),
        url: "fake://".to_owned(),
        status: 409,
        message: message.to_owned(),
    }
}

fn page_of<T: Clone>(items: &[T], cursor: Option<String>, size: usize) -> ApiResult<Page<T>> {
    let start = match cursor {
        Some(cursor) => cursor
            .parse::<usize>()
            .map_err(|_| conflict("invalid cursor"))?,
        None => 0,
    };
    let end = items.len().min(start + size);
    let next = (end < items.len()).then(|| end.to_string());
    Ok(Page::new(items[start.min(end)..end].to_vec(), next))
}

#[derive(Default)]
pub struct FakeCloud {
    pub findings: Arc<FakeFindings>,
    pub power: Arc<FakePower>,
    pub vpc: Arc<FakeVpc>,
    pub tagging: Arc<FakeTagging>,
}

impl FakeCloud {
    pub fn session(&self) -> Session {
        Session {
            account_id: Some(ACCOUNT_ID.to_owned()),
            findings: self.findings.clone(),
            power: self.power.clone(),
            vpc: self.vpc.clone(),
            tagging: self.tagging.clone(),
        }
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle::configured(self.session())
    }
}

type NoteKey = (String, String, String);

#[derive(Default)]
pub struct FakeFindings {
    pub notes: Mutex<BTreeMap<NoteKey, ApiNote>>,
    pub list_calls: AtomicUsize,
    /// Providers by account, in listing order
    pub providers: Mutex<HashMap<String, Vec<ApiProvider>>>,
    pub provider_list_calls: AtomicUsize,
}

impl FakeFindings {
    const PAGE_SIZE: usize = 2;

    fn key(account_id: &str, provider_id: &str, note_id: &str) -> NoteKey {
        (
            account_id.to_owned(),
            provider_id.to_owned(),
            note_id.to_owned(),
        )
    }
}

#[async_trait]
impl FindingsApi for FakeFindings {
    async fn create_note(
        &self,
        account_id: &str,
        provider_id: &str,
        note: &ApiNote,
    ) -> ApiResult<ApiNote> {
        let note_id = note.id.clone().unwrap_or_default();
        let mut notes = self.notes.lock().unwrap();
        let key = Self::key(account_id, provider_id, &note_id);
        if notes.contains_key(&key) {
            return Err(conflict("note already exists"));
        }
        let note = ApiNote {
            create_time: Some(TIMESTAMP.to_owned()),
            update_time: Some(TIMESTAMP.to_owned()),
            shared: note.shared.or(Some(true)),
            ..note.clone()
        };
        notes.insert(key, note.clone());
        Ok(note)
    }

    async fn get_note(
        &self,
        account_id: &str,
        provider_id: &str,
        note_id: &str,
    ) -> ApiResult<ApiNote> {
        self.notes
            .lock()
            .unwrap()
            .get(&Self::key(account_id, provider_id, note_id))
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("note {note_id} not found")))
    }

    async fn update_note(
        &self,
        account_id: &str,
        provider_id: &str,
        note_id: &str,
        note: &ApiNote,
    ) -> ApiResult<ApiNote> {
        let mut notes = self.notes.lock().unwrap();
        let existing = notes
            .get_mut(&Self::key(account_id, provider_id, note_id))
            .ok_or_else(|| ApiError::not_found(format!("note {note_id} not found")))?;
        *existing = ApiNote {
            id: Some(note_id.to_owned()),
            create_time: existing.create_time.clone(),
            update_time: Some("2024-05-02T10:00:00Z".to_owned()),
            shared: note.shared.or(Some(true)),
            ..note.clone()
        };
        Ok(existing.clone())
    }

    async fn delete_note(
        &self,
        account_id: &str,
        provider_id: &str,
        note_id: &str,
    ) -> ApiResult<()> {
        self.notes
            .lock()
            .unwrap()
            .remove(&Self::key(account_id, provider_id, note_id))
            .map(|_| ())
            .ok_or_else(|| ApiError::not_found(format!("note {note_id} not found")))
    }

    async fn list_notes(
        &self,
        account_id: &str,
        provider_id: &str,
        page_token: Option<String>,
    ) -> ApiResult<Page<ApiNote>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let notes: Vec<ApiNote> = self
            .notes
            .lock()
            .unwrap()
            .iter()
            .filter(|((account, provider, _), _)| account == account_id && provider == provider_id)
            .map(|(_, note)| note.clone())
            .collect();
        page_of(&notes, page_token, Self::PAGE_SIZE)
    }

    async fn list_providers(
        &self,
        account_id: &str,
        page_token: Option<String>,
    ) -> ApiResult<Page<ApiProvider>> {
        self.provider_list_calls.fetch_add(1, Ordering::SeqCst);
        let providers = self
            .providers
            .lock()
            .unwrap()
            .get(account_id)
            .cloned()
            .unwrap_or_default();
        page_of(&providers, page_token, Self::PAGE_SIZE)
    }
}

#[derive(Default)]
pub struct FakePower {
    pub groups: Mutex<BTreeMap<(String, String), ApiPlacementGroup>>,
    pub next_id: AtomicUsize,
}

#[async_trait]
impl PowerApi for FakePower {
    async fn create_placement_group(
        &self,
        cloud_instance_id: &str,
        body: &ApiPlacementGroupCreate,
    ) -> ApiResult<ApiPlacementGroup> {
        let mut groups = self.groups.lock().unwrap();
        if groups.iter().any(|((cloud, _), group)| {
            cloud == cloud_instance_id && group.name.as_deref() == Some(&body.name)
        }) {
            return Err(conflict("placement group name already used"));
        }
        let id = format!("pg-{:04}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let group = ApiPlacementGroup {
            id: Some(id.clone()),
            name: Some(body.name.clone()),
            policy: Some(body.policy.clone()),
            crn: Some(format!(
                "crn:v1:bluemix:public:power-iaas:dal12:a/{ACCOUNT_ID}:{cloud_instance_id}:placement-group:{id}"
            )),
            members: Some(Vec::new()),
        };
        groups.insert((cloud_instance_id.to_owned(), id), group.clone());
        Ok(group)
    }

    async fn get_placement_group(
        &self,
        cloud_instance_id: &str,
        placement_group: &str,
    ) -> ApiResult<ApiPlacementGroup> {
        self.groups
            .lock()
            .unwrap()
            .iter()
            .find(|((cloud, id), group)| {
                cloud == cloud_instance_id
                    && (id == placement_group || group.name.as_deref() == Some(placement_group))
            })
            .map(|(_, group)| group.clone())
            .ok_or_else(|| ApiError::not_found(format!("placement group {placement_group} does not exist")))
    }

    async fn list_placement_groups(
        &self,
        cloud_instance_id: &str,
    ) -> ApiResult<Vec<ApiPlacementGroup>> {
        Ok(self
            .groups
            .lock()
            .unwrap()
            .iter()
            .filter(|((cloud, _), _)| cloud == cloud_instance_id)
            .map(|(_, group)| group.clone())
            .collect())
    }

    async fn delete_placement_group(
        &self,
        cloud_instance_id: &str,
        placement_group_id: &str,
    ) -> ApiResult<()> {
        self.groups
            .lock()
            .unwrap()
            .remove(&(cloud_instance_id.to_owned(), placement_group_id.to_owned()))
            .map(|_| ())
            .ok_or_else(|| ApiError::not_found("placement group does not exist"))
    }
}

#[derive(Default)]
pub struct FakeTagging {
    /// User tags by CRN
    pub tags: Mutex<HashMap<String, Vec<String>>>,
    /// Make every lookup fail
    pub fail: AtomicBool,
}

#[async_trait]
impl TaggingApi for FakeTagging {
    async fn list_user_tags(&self, crn: &str) -> ApiResult<Vec<String>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                method: "GET".to_owned(),
                url: "fake://tags".to_owned(),
                status: 503,
                message: "tagging service unavailable".to_owned(),
            });
        }
        Ok(self
            .tags
            .lock()
            .unwrap()
            .get(crn)
            .cloned()
            .unwrap_or_default())
    }
}

pub struct FakeVpc {
    pub ike_policies: Mutex<BTreeMap<String, ApiIkePolicy>>,
    pub connections: Mutex<HashMap<String, Vec<ApiVpnConnectionReference>>>,
    pub disks: Mutex<BTreeMap<(String, String), ApiBareMetalServerDisk>>,
    pub next_id: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub page_size: usize,
    /// Make the connection listing fail
    pub fail_connections: AtomicBool,
}

impl Default for FakeVpc {
    fn default() -> Self {
        Self {
            ike_policies: Default::default(),
            connections: Default::default(),
            disks: Default::default(),
            next_id: Default::default(),
            list_calls: Default::default(),
            page_size: 2,
            fail_connections: Default::default(),
        }
    }
}

impl FakeVpc {
    pub fn add_ike_policy(&self, name: &str) -> String {
        let id = format!("r006-ike-{:04}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let policy = ApiIkePolicy {
            id: Some(id.clone()),
            href: Some(format!("https://fake/v1/ike_policies/{id}")),
            name: Some(name.to_owned()),
            authentication_algorithm: Some("sha256".to_owned()),
            encryption_algorithm: Some("aes256".to_owned()),
            dh_group: Some(14),
            ike_version: Some(2),
            key_lifetime: Some(28800),
            negotiation_mode: Some("main".to_owned()),
            resource_type: Some("ike_policy".to_owned()),
            created_at: Some(TIMESTAMP.to_owned()),
            resource_group: Some(ApiResourceGroupReference {
                id: Some("rg-default".to_owned()),
                href: None,
                name: Some("Default".to_owned()),
            }),
            connections: None,
        };
        self.ike_policies.lock().unwrap().insert(id.clone(), policy);
        id
    }

    pub fn add_disk(&self, bare_metal_server: &str, disk: &str, name: &str) {
        self.disks.lock().unwrap().insert(
            (bare_metal_server.to_owned(), disk.to_owned()),
            ApiBareMetalServerDisk {
                id: Some(disk.to_owned()),
                href: Some(format!(
                    "https://fake/v1/bare_metal_servers/{bare_metal_server}/disks/{disk}"
                )),
                name: Some(name.to_owned()),
                size: Some(960),
                interface_type: Some("nvme".to_owned()),
                resource_type: Some("bare_metal_server_disk".to_owned()),
                created_at: Some(TIMESTAMP.to_owned()),
                allowed_use: None,
            },
        );
    }
}

#[async_trait]
impl VpcApi for FakeVpc {
    async fn create_ike_policy(&self, body: &ApiIkePolicyPrototype) -> ApiResult<ApiIkePolicy> {
        let id = self.add_ike_policy(&body.name);
        let mut policies = self.ike_policies.lock().unwrap();
        let policy = policies
            .get_mut(&id)
            .ok_or_else(|| ApiError::not_found("IKE policy vanished"))?;
        policy.authentication_algorithm = Some(body.authentication_algorithm.clone());
        policy.encryption_algorithm = Some(body.encryption_algorithm.clone());
        policy.dh_group = Some(body.dh_group);
        policy.ike_version = body.ike_version.or(Some(2));
        policy.key_lifetime = body.key_lifetime.or(Some(28800));
        if let Some(group) = &body.resource_group {
            policy.resource_group = Some(ApiResourceGroupReference {
                id: Some(group.id.clone()),
                href: None,
                name: None,
            });
        }
        Ok(policy.clone())
    }

    async fn get_ike_policy(&self, id: &str) -> ApiResult<ApiIkePolicy> {
        self.ike_policies
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("IKE policy {id} not found")))
    }

    async fn update_ike_policy(
        &self,
        id: &str,
        patch: &ApiIkePolicyPatch,
    ) -> ApiResult<ApiIkePolicy> {
        let mut policies = self.ike_policies.lock().unwrap();
        let policy = policies
            .get_mut(id)
            .ok_or_else(|| ApiError::not_found(format!("IKE policy {id} not found")))?;
        if let Some(name) = &patch.name {
            policy.name = Some(name.clone());
        }
        if let Some(algorithm) = &patch.authentication_algorithm {
            policy.authentication_algorithm = Some(algorithm.clone());
        }
        if let Some(algorithm) = &patch.encryption_algorithm {
            policy.encryption_algorithm = Some(algorithm.clone());
        }
        policy.dh_group = patch.dh_group.or(policy.dh_group);
        policy.ike_version = patch.ike_version.or(policy.ike_version);
        policy.key_lifetime = patch.key_lifetime.or(policy.key_lifetime);
        Ok(policy.clone())
    }

    async fn delete_ike_policy(&self, id: &str) -> ApiResult<()> {
        self.ike_policies
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ApiError::not_found(format!("IKE policy {id} not found")))
    }

    async fn list_ike_policies(&self, start: Option<String>) -> ApiResult<Page<ApiIkePolicy>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let policies: Vec<ApiIkePolicy> =
            self.ike_policies.lock().unwrap().values().cloned().collect();
        page_of(&policies, start, self.page_size)
    }

    async fn list_ike_policy_connections(
        &self,
        id: &str,
    ) -> ApiResult<Vec<ApiVpnConnectionReference>> {
        if self.fail_connections.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                method: "GET".to_owned(),
                url: format!("fake://ike_policies/{id}/connections"),
                status: 403,
                message: "forbidden".to_owned(),
            });
        }
        Ok(self
            .connections
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_bare_metal_server_disk(
        &self,
        bare_metal_server: &str,
        disk: &str,
    ) -> ApiResult<ApiBareMetalServerDisk> {
        self.disks
            .lock()
            .unwrap()
            .get(&(bare_metal_server.to_owned(), disk.to_owned()))
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("disk {disk} not found")))
    }

    async fn update_bare_metal_server_disk(
        &self,
        bare_metal_server: &str,
        disk: &str,
        patch: &ApiBareMetalServerDiskPatch,
    ) -> ApiResult<ApiBareMetalServerDisk> {
        let mut disks = self.disks.lock().unwrap();
        let existing = disks
            .get_mut(&(bare_metal_server.to_owned(), disk.to_owned()))
            .ok_or_else(|| ApiError::not_found(format!("disk {disk} not found")))?;
        if let Some(name) = &patch.name {
            existing.name = Some(name.clone());
        }
        Ok(existing.clone())
    }

    async fn list_bare_metal_server_disks(
        &self,
        bare_metal_server: &str,
    ) -> ApiResult<Vec<ApiBareMetalServerDisk>> {
        let disks = self.disks.lock().unwrap();
        let found: Vec<_> = disks
            .iter()
            .filter(|((server, _), _)| server == bare_metal_server)
            .map(|(_, disk)| disk.clone())
            .collect();
        if found.is_empty() {
            return Err(ApiError::not_found(format!(
                "bare metal server {bare_metal_server} not found"
            )));
        }
        Ok(found)
    }
}

//! In-memory store for tests and local development.
//!
//! Mirrors the Postgres schema's constraints (unique names and slugs,
//! restricted provider/type deletes, cascading termination deletes) so the
//! views behave the same against either backend. Data is lost on restart.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{
    CircuitStore, CircuitTypeStore, ProviderStore, ReferenceStore, StoreError, StoreResult,
    TerminationStore,
};
use crate::common::{
    CircuitId, CircuitTypeId, GraphId, Page, PageRequest, ProviderId, SiteId, TenantId,
    TerminationId,
};
use crate::domains::circuits::filters::{slug_matches, CircuitFilter, ProviderFilter};
use crate::domains::circuits::models::{
    Circuit, CircuitBulkUpdate, CircuitInput, CircuitRow, CircuitType, CircuitTypeInput,
    CircuitTypeListRow, Graph, GraphType, Provider, ProviderBulkUpdate, ProviderInput,
    ProviderListRow, Site, TermSide, Tenant, Termination, TerminationInput, TerminationRow,
};

#[derive(Default)]
struct State {
    providers: HashMap<ProviderId, Provider>,
    circuit_types: HashMap<CircuitTypeId, CircuitType>,
    circuits: HashMap<CircuitId, Circuit>,
    terminations: HashMap<TerminationId, Termination>,
    sites: HashMap<SiteId, Site>,
    tenants: HashMap<TenantId, Tenant>,
    graphs: Vec<Graph>,
}

impl State {
    fn circuit_row(&self, circuit: &Circuit) -> CircuitRow {
        let provider = self.providers.get(&circuit.provider_id);
        let circuit_type = self.circuit_types.get(&circuit.type_id);
        let tenant = circuit.tenant_id.and_then(|id| self.tenants.get(&id));
        let site = circuit.site_id.and_then(|id| self.sites.get(&id));
        CircuitRow {
            circuit: circuit.clone(),
            provider_name: provider.map(|p| p.name.clone()).unwrap_or_default(),
            provider_slug: provider.map(|p| p.slug.clone()).unwrap_or_default(),
            type_name: circuit_type.map(|t| t.name.clone()).unwrap_or_default(),
            type_slug: circuit_type.map(|t| t.slug.clone()).unwrap_or_default(),
            tenant_name: tenant.map(|t| t.name.clone()),
            tenant_slug: tenant.map(|t| t.slug.clone()),
            site_name: site.map(|s| s.name.clone()),
            site_slug: site.map(|s| s.slug.clone()),
            count_terminations: self
                .terminations
                .values()
                .filter(|t| t.circuit_id == circuit.id)
                .count() as i64,
        }
    }

    fn termination_row(&self, termination: &Termination) -> TerminationRow {
        let site = self.sites.get(&termination.site_id);
        let circuit = self.circuits.get(&termination.circuit_id);
        let provider = circuit.and_then(|c| self.providers.get(&c.provider_id));
        TerminationRow {
            termination: termination.clone(),
            site_name: site.map(|s| s.name.clone()).unwrap_or_default(),
            site_slug: site.map(|s| s.slug.clone()).unwrap_or_default(),
            provider_name: provider.map(|p| p.name.clone()).unwrap_or_default(),
            cid: circuit.map(|c| c.cid.clone()).unwrap_or_default(),
        }
    }

    fn site_slug(&self, id: Option<SiteId>) -> Option<&str> {
        id.and_then(|id| self.sites.get(&id)).map(|s| s.slug.as_str())
    }

    /// Slugs of every site a circuit is placed at or terminates at.
    fn circuit_site_slugs(&self, circuit: &Circuit) -> Vec<&str> {
        let mut slugs: Vec<&str> = self.site_slug(circuit.site_id).into_iter().collect();
        slugs.extend(
            self.terminations
                .values()
                .filter(|t| t.circuit_id == circuit.id)
                .filter_map(|t| self.site_slug(Some(t.site_id))),
        );
        slugs
    }

    fn circuit_matches(&self, circuit: &Circuit, filter: &CircuitFilter) -> bool {
        let row = self.circuit_row(circuit);
        filter.matches_text(&[circuit.cid.as_str(), circuit.description.as_str(), circuit.comments.as_str()])
            && slug_matches(&filter.provider, Some(&row.provider_slug))
            && slug_matches(&filter.circuit_type, Some(&row.type_slug))
            && slug_matches(&filter.tenant, row.tenant_slug.as_deref())
            && (filter.site.is_empty()
                || self
                    .circuit_site_slugs(circuit)
                    .into_iter()
                    .any(|s| slug_matches(&filter.site, Some(s))))
    }

    fn provider_matches(&self, provider: &Provider, filter: &ProviderFilter) -> bool {
        filter.matches_text(&[provider.name.as_str(), provider.account.as_str(), provider.comments.as_str()])
            && filter.asn.map_or(true, |asn| provider.asn == Some(asn))
            && (filter.site.is_empty()
                || self
                    .circuits
                    .values()
                    .filter(|c| c.provider_id == provider.id)
                    .flat_map(|c| self.circuit_site_slugs(c))
                    .any(|s| slug_matches(&filter.site, Some(s))))
    }

    fn circuits_using<F: Fn(&Circuit) -> bool>(&self, pred: F) -> i64 {
        self.circuits.values().filter(|c| pred(c)).count() as i64
    }

    fn check_provider_unique(
        &self,
        input: &ProviderInput,
        exclude: Option<ProviderId>,
    ) -> StoreResult<()> {
        for p in self.providers.values().filter(|p| Some(p.id) != exclude) {
            if p.name == input.name {
                return Err(conflict("provider", "name"));
            }
            if p.slug == input.slug {
                return Err(conflict("provider", "slug"));
            }
        }
        Ok(())
    }

    fn check_circuit_type_unique(
        &self,
        input: &CircuitTypeInput,
        exclude: Option<CircuitTypeId>,
    ) -> StoreResult<()> {
        for t in self.circuit_types.values().filter(|t| Some(t.id) != exclude) {
            if t.name == input.name {
                return Err(conflict("circuit type", "name"));
            }
            if t.slug == input.slug {
                return Err(conflict("circuit type", "slug"));
            }
        }
        Ok(())
    }

    fn check_circuit_unique(&self, input: &CircuitInput, exclude: Option<CircuitId>) -> StoreResult<()> {
        let taken = self.circuits.values().any(|c| {
            Some(c.id) != exclude && c.provider_id == input.provider_id && c.cid == input.cid
        });
        if taken {
            return Err(conflict("circuit", "cid"));
        }
        Ok(())
    }

    fn check_termination_unique(
        &self,
        circuit_id: CircuitId,
        side: TermSide,
        exclude: Option<TerminationId>,
    ) -> StoreResult<()> {
        let side = side.to_string();
        let taken = self.terminations.values().any(|t| {
            Some(t.id) != exclude && t.circuit_id == circuit_id && t.term_side == side
        });
        if taken {
            return Err(conflict("termination", "side"));
        }
        Ok(())
    }

    fn new_provider(input: &ProviderInput) -> Provider {
        let now = Utc::now();
        Provider {
            id: ProviderId::new(),
            name: input.name.clone(),
            slug: input.slug.clone(),
            asn: input.asn,
            account: input.account.clone(),
            portal_url: input.portal_url.clone(),
            noc_contact: input.noc_contact.clone(),
            admin_contact: input.admin_contact.clone(),
            comments: input.comments.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    fn new_circuit(input: &CircuitInput) -> Circuit {
        let now = Utc::now();
        Circuit {
            id: CircuitId::new(),
            cid: input.cid.clone(),
            provider_id: input.provider_id,
            type_id: input.type_id,
            tenant_id: input.tenant_id,
            site_id: input.site_id,
            install_date: input.install_date,
            commit_rate: input.commit_rate,
            description: input.description.clone(),
            comments: input.comments.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

fn conflict(entity: &'static str, field: &'static str) -> StoreError {
    StoreError::Conflict { entity, field }
}

fn sorted_by_name<T, F: Fn(&T) -> String>(mut items: Vec<T>, key: F) -> Vec<T> {
    items.sort_by_key(|item| key(item).to_lowercase());
    items
}

/// In-memory storage for every circuits entity.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProviderStore for MemoryStore {
    async fn list_providers(
        &self,
        filter: &ProviderFilter,
        page: PageRequest,
    ) -> StoreResult<Page<ProviderListRow>> {
        let state = self.state.read().await;
        let rows = state
            .providers
            .values()
            .filter(|p| state.provider_matches(p, filter))
            .map(|p| ProviderListRow {
                provider: p.clone(),
                count_circuits: state.circuits_using(|c| c.provider_id == p.id),
            })
            .collect();
        let rows = sorted_by_name(rows, |r: &ProviderListRow| r.provider.name.clone());
        Ok(Page::from_vec(rows, page))
    }

    async fn all_providers(&self) -> StoreResult<Vec<Provider>> {
        let state = self.state.read().await;
        let providers = state.providers.values().cloned().collect();
        Ok(sorted_by_name(providers, |p: &Provider| p.name.clone()))
    }

    async fn get_provider(&self, id: ProviderId) -> StoreResult<Option<Provider>> {
        Ok(self.state.read().await.providers.get(&id).cloned())
    }

    async fn get_provider_by_slug(&self, slug: &str) -> StoreResult<Option<Provider>> {
        let state = self.state.read().await;
        Ok(state.providers.values().find(|p| p.slug == slug).cloned())
    }

    async fn find_provider_by_name(&self, name: &str) -> StoreResult<Option<Provider>> {
        let state = self.state.read().await;
        Ok(state.providers.values().find(|p| p.name == name).cloned())
    }

    async fn get_providers(&self, ids: &[ProviderId]) -> StoreResult<Vec<Provider>> {
        let state = self.state.read().await;
        let providers = ids
            .iter()
            .filter_map(|id| state.providers.get(id).cloned())
            .collect();
        Ok(sorted_by_name(providers, |p: &Provider| p.name.clone()))
    }

    async fn insert_provider(&self, input: &ProviderInput) -> StoreResult<Provider> {
        let mut state = self.state.write().await;
        state.check_provider_unique(input, None)?;
        let provider = State::new_provider(input);
        state.providers.insert(provider.id, provider.clone());
        Ok(provider)
    }

    async fn insert_providers(&self, inputs: &[ProviderInput]) -> StoreResult<Vec<Provider>> {
        let mut state = self.state.write().await;
        // Validate the whole batch against existing rows and itself first
        for (i, input) in inputs.iter().enumerate() {
            state.check_provider_unique(input, None)?;
            let earlier = &inputs[..i];
            if earlier.iter().any(|other| other.name == input.name) {
                return Err(conflict("provider", "name"));
            }
            if earlier.iter().any(|other| other.slug == input.slug) {
                return Err(conflict("provider", "slug"));
            }
        }
        let providers: Vec<Provider> = inputs.iter().map(State::new_provider).collect();
        for provider in &providers {
            state.providers.insert(provider.id, provider.clone());
        }
        Ok(providers)
    }

    async fn update_provider(
        &self,
        id: ProviderId,
        input: &ProviderInput,
    ) -> StoreResult<Provider> {
        let mut state = self.state.write().await;
        state.check_provider_unique(input, Some(id))?;
        let provider = state
            .providers
            .get_mut(&id)
            .ok_or(StoreError::NotFound { entity: "provider" })?;
        provider.name = input.name.clone();
        provider.slug = input.slug.clone();
        provider.asn = input.asn;
        provider.account = input.account.clone();
        provider.portal_url = input.portal_url.clone();
        provider.noc_contact = input.noc_contact.clone();
        provider.admin_contact = input.admin_contact.clone();
        provider.comments = input.comments.clone();
        provider.updated_at = Utc::now();
        Ok(provider.clone())
    }

    async fn bulk_update_providers(
        &self,
        ids: &[ProviderId],
        update: &ProviderBulkUpdate,
    ) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let mut updated = 0;
        for id in ids {
            if let Some(provider) = state.providers.get_mut(id) {
                if let Some(asn) = update.asn {
                    provider.asn = Some(asn);
                }
                if let Some(account) = &update.account {
                    provider.account = account.clone();
                }
                if let Some(portal_url) = &update.portal_url {
                    provider.portal_url = portal_url.clone();
                }
                if let Some(comments) = &update.comments {
                    provider.comments = comments.clone();
                }
                provider.updated_at = Utc::now();
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn delete_providers(&self, ids: &[ProviderId]) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        for id in ids {
            let in_use = state.circuits_using(|c| c.provider_id == *id);
            if in_use > 0 {
                let name = state
                    .providers
                    .get(id)
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                return Err(StoreError::Protected {
                    entity: "provider",
                    name,
                    count: in_use,
                });
            }
        }
        let deleted = ids
            .iter()
            .filter(|id| state.providers.remove(*id).is_some())
            .count();
        Ok(deleted as u64)
    }

    async fn count_providers(&self) -> StoreResult<u64> {
        Ok(self.state.read().await.providers.len() as u64)
    }
}

#[async_trait]
impl CircuitTypeStore for MemoryStore {
    async fn list_circuit_types(&self, page: PageRequest) -> StoreResult<Page<CircuitTypeListRow>> {
        let state = self.state.read().await;
        let rows = state
            .circuit_types
            .values()
            .map(|t| CircuitTypeListRow {
                circuit_type: t.clone(),
                circuit_count: state.circuits_using(|c| c.type_id == t.id),
            })
            .collect();
        let rows = sorted_by_name(rows, |r: &CircuitTypeListRow| r.circuit_type.name.clone());
        Ok(Page::from_vec(rows, page))
    }

    async fn all_circuit_types(&self) -> StoreResult<Vec<CircuitType>> {
        let state = self.state.read().await;
        let types = state.circuit_types.values().cloned().collect();
        Ok(sorted_by_name(types, |t: &CircuitType| t.name.clone()))
    }

    async fn get_circuit_type(&self, id: CircuitTypeId) -> StoreResult<Option<CircuitType>> {
        Ok(self.state.read().await.circuit_types.get(&id).cloned())
    }

    async fn get_circuit_type_by_slug(&self, slug: &str) -> StoreResult<Option<CircuitType>> {
        let state = self.state.read().await;
        Ok(state.circuit_types.values().find(|t| t.slug == slug).cloned())
    }

    async fn find_circuit_type_by_name(&self, name: &str) -> StoreResult<Option<CircuitType>> {
        let state = self.state.read().await;
        Ok(state.circuit_types.values().find(|t| t.name == name).cloned())
    }

    async fn get_circuit_types(&self, ids: &[CircuitTypeId]) -> StoreResult<Vec<CircuitType>> {
        let state = self.state.read().await;
        let types = ids
            .iter()
            .filter_map(|id| state.circuit_types.get(id).cloned())
            .collect();
        Ok(sorted_by_name(types, |t: &CircuitType| t.name.clone()))
    }

    async fn insert_circuit_type(&self, input: &CircuitTypeInput) -> StoreResult<CircuitType> {
        let mut state = self.state.write().await;
        state.check_circuit_type_unique(input, None)?;
        let now = Utc::now();
        let circuit_type = CircuitType {
            id: CircuitTypeId::new(),
            name: input.name.clone(),
            slug: input.slug.clone(),
            created_at: now,
            updated_at: now,
        };
        state
            .circuit_types
            .insert(circuit_type.id, circuit_type.clone());
        Ok(circuit_type)
    }

    async fn update_circuit_type(
        &self,
        id: CircuitTypeId,
        input: &CircuitTypeInput,
    ) -> StoreResult<CircuitType> {
        let mut state = self.state.write().await;
        state.check_circuit_type_unique(input, Some(id))?;
        let circuit_type = state
            .circuit_types
            .get_mut(&id)
            .ok_or(StoreError::NotFound {
                entity: "circuit type",
            })?;
        circuit_type.name = input.name.clone();
        circuit_type.slug = input.slug.clone();
        circuit_type.updated_at = Utc::now();
        Ok(circuit_type.clone())
    }

    async fn delete_circuit_types(&self, ids: &[CircuitTypeId]) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        for id in ids {
            let in_use = state.circuits_using(|c| c.type_id == *id);
            if in_use > 0 {
                let name = state
                    .circuit_types
                    .get(id)
                    .map(|t| t.name.clone())
                    .unwrap_or_default();
                return Err(StoreError::Protected {
                    entity: "circuit type",
                    name,
                    count: in_use,
                });
            }
        }
        let deleted = ids
            .iter()
            .filter(|id| state.circuit_types.remove(*id).is_some())
            .count();
        Ok(deleted as u64)
    }

    async fn count_circuit_types(&self) -> StoreResult<u64> {
        Ok(self.state.read().await.circuit_types.len() as u64)
    }
}

#[async_trait]
impl CircuitStore for MemoryStore {
    async fn list_circuits(
        &self,
        filter: &CircuitFilter,
        page: PageRequest,
    ) -> StoreResult<Page<CircuitRow>> {
        let state = self.state.read().await;
        let mut rows: Vec<CircuitRow> = state
            .circuits
            .values()
            .filter(|c| state.circuit_matches(c, filter))
            .map(|c| state.circuit_row(c))
            .collect();
        rows.sort_by(|a, b| {
            (a.provider_name.to_lowercase(), &a.circuit.cid)
                .cmp(&(b.provider_name.to_lowercase(), &b.circuit.cid))
        });
        Ok(Page::from_vec(rows, page))
    }

    async fn circuits_for_provider(&self, provider_id: ProviderId) -> StoreResult<Vec<CircuitRow>> {
        let state = self.state.read().await;
        let mut rows: Vec<CircuitRow> = state
            .circuits
            .values()
            .filter(|c| c.provider_id == provider_id)
            .map(|c| state.circuit_row(c))
            .collect();
        rows.sort_by(|a, b| a.circuit.cid.cmp(&b.circuit.cid));
        Ok(rows)
    }

    async fn get_circuit(&self, id: CircuitId) -> StoreResult<Option<CircuitRow>> {
        let state = self.state.read().await;
        Ok(state.circuits.get(&id).map(|c| state.circuit_row(c)))
    }

    async fn get_circuits(&self, ids: &[CircuitId]) -> StoreResult<Vec<CircuitRow>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.circuits.get(id))
            .map(|c| state.circuit_row(c))
            .collect())
    }

    async fn find_circuit(
        &self,
        provider_id: ProviderId,
        cid: &str,
    ) -> StoreResult<Option<Circuit>> {
        let state = self.state.read().await;
        Ok(state
            .circuits
            .values()
            .find(|c| c.provider_id == provider_id && c.cid == cid)
            .cloned())
    }

    async fn insert_circuit(&self, input: &CircuitInput) -> StoreResult<Circuit> {
        let mut state = self.state.write().await;
        state.check_circuit_unique(input, None)?;
        let circuit = State::new_circuit(input);
        state.circuits.insert(circuit.id, circuit.clone());
        Ok(circuit)
    }

    async fn insert_circuits(&self, inputs: &[CircuitInput]) -> StoreResult<Vec<Circuit>> {
        let mut state = self.state.write().await;
        for (i, input) in inputs.iter().enumerate() {
            state.check_circuit_unique(input, None)?;
            if inputs[..i]
                .iter()
                .any(|other| other.provider_id == input.provider_id && other.cid == input.cid)
            {
                return Err(conflict("circuit", "cid"));
            }
        }
        let circuits: Vec<Circuit> = inputs.iter().map(State::new_circuit).collect();
        for circuit in &circuits {
            state.circuits.insert(circuit.id, circuit.clone());
        }
        Ok(circuits)
    }

    async fn update_circuit(&self, id: CircuitId, input: &CircuitInput) -> StoreResult<Circuit> {
        let mut state = self.state.write().await;
        state.check_circuit_unique(input, Some(id))?;
        let circuit = state
            .circuits
            .get_mut(&id)
            .ok_or(StoreError::NotFound { entity: "circuit" })?;
        circuit.cid = input.cid.clone();
        circuit.provider_id = input.provider_id;
        circuit.type_id = input.type_id;
        circuit.tenant_id = input.tenant_id;
        circuit.site_id = input.site_id;
        circuit.install_date = input.install_date;
        circuit.commit_rate = input.commit_rate;
        circuit.description = input.description.clone();
        circuit.comments = input.comments.clone();
        circuit.updated_at = Utc::now();
        Ok(circuit.clone())
    }

    async fn bulk_update_circuits(
        &self,
        ids: &[CircuitId],
        update: &CircuitBulkUpdate,
    ) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        // A provider change may collide with an existing cid, or with another
        // selected circuit moving alongside; check before touching anything
        if let Some(provider_id) = update.provider_id {
            let mut moved: HashMap<&str, CircuitId> = HashMap::new();
            for id in ids {
                if let Some(circuit) = state.circuits.get(id) {
                    let probe = CircuitInput {
                        cid: circuit.cid.clone(),
                        provider_id,
                        type_id: circuit.type_id,
                        tenant_id: circuit.tenant_id,
                        site_id: circuit.site_id,
                        install_date: circuit.install_date,
                        commit_rate: circuit.commit_rate,
                        description: circuit.description.clone(),
                        comments: circuit.comments.clone(),
                    };
                    state.check_circuit_unique(&probe, Some(*id))?;
                    match moved.insert(circuit.cid.as_str(), *id) {
                        Some(other) if other != *id => return Err(conflict("circuit", "cid")),
                        _ => {}
                    }
                }
            }
        }
        let mut updated = 0;
        for id in ids {
            if let Some(circuit) = state.circuits.get_mut(id) {
                if let Some(provider_id) = update.provider_id {
                    circuit.provider_id = provider_id;
                }
                if let Some(type_id) = update.type_id {
                    circuit.type_id = type_id;
                }
                if let Some(tenant_id) = update.tenant_id {
                    circuit.tenant_id = tenant_id;
                }
                if let Some(commit_rate) = update.commit_rate {
                    circuit.commit_rate = Some(commit_rate);
                }
                if let Some(description) = &update.description {
                    circuit.description = description.clone();
                }
                if let Some(comments) = &update.comments {
                    circuit.comments = comments.clone();
                }
                circuit.updated_at = Utc::now();
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn delete_circuits(&self, ids: &[CircuitId]) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let mut deleted = 0;
        for id in ids {
            if state.circuits.remove(id).is_some() {
                state.terminations.retain(|_, t| t.circuit_id != *id);
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn count_circuits(&self) -> StoreResult<u64> {
        Ok(self.state.read().await.circuits.len() as u64)
    }
}

#[async_trait]
impl TerminationStore for MemoryStore {
    async fn terminations_for_circuit(
        &self,
        circuit_id: CircuitId,
    ) -> StoreResult<Vec<TerminationRow>> {
        let state = self.state.read().await;
        let mut rows: Vec<TerminationRow> = state
            .terminations
            .values()
            .filter(|t| t.circuit_id == circuit_id)
            .map(|t| state.termination_row(t))
            .collect();
        rows.sort_by(|a, b| a.termination.term_side.cmp(&b.termination.term_side));
        Ok(rows)
    }

    async fn get_termination(&self, id: TerminationId) -> StoreResult<Option<TerminationRow>> {
        let state = self.state.read().await;
        Ok(state.terminations.get(&id).map(|t| state.termination_row(t)))
    }

    async fn find_termination(
        &self,
        circuit_id: CircuitId,
        side: TermSide,
    ) -> StoreResult<Option<Termination>> {
        let state = self.state.read().await;
        let side = side.to_string();
        Ok(state
            .terminations
            .values()
            .find(|t| t.circuit_id == circuit_id && t.term_side == side)
            .cloned())
    }

    async fn insert_termination(
        &self,
        circuit_id: CircuitId,
        input: &TerminationInput,
    ) -> StoreResult<Termination> {
        let mut state = self.state.write().await;
        if !state.circuits.contains_key(&circuit_id) {
            return Err(StoreError::NotFound { entity: "circuit" });
        }
        state.check_termination_unique(circuit_id, input.term_side, None)?;
        let termination = Termination {
            id: TerminationId::new(),
            circuit_id,
            term_side: input.term_side.to_string(),
            site_id: input.site_id,
            port_speed: input.port_speed,
            upstream_speed: input.upstream_speed,
            xconnect_id: input.xconnect_id.clone(),
            pp_info: input.pp_info.clone(),
        };
        state.terminations.insert(termination.id, termination.clone());
        Ok(termination)
    }

    async fn update_termination(
        &self,
        id: TerminationId,
        input: &TerminationInput,
    ) -> StoreResult<Termination> {
        let mut state = self.state.write().await;
        let circuit_id = state
            .terminations
            .get(&id)
            .map(|t| t.circuit_id)
            .ok_or(StoreError::NotFound {
                entity: "termination",
            })?;
        state.check_termination_unique(circuit_id, input.term_side, Some(id))?;
        let termination = state
            .terminations
            .get_mut(&id)
            .ok_or(StoreError::NotFound {
                entity: "termination",
            })?;
        termination.term_side = input.term_side.to_string();
        termination.site_id = input.site_id;
        termination.port_speed = input.port_speed;
        termination.upstream_speed = input.upstream_speed;
        termination.xconnect_id = input.xconnect_id.clone();
        termination.pp_info = input.pp_info.clone();
        Ok(termination.clone())
    }

    async fn delete_termination(&self, id: TerminationId) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        Ok(u64::from(state.terminations.remove(&id).is_some()))
    }

    async fn count_terminations(&self) -> StoreResult<u64> {
        Ok(self.state.read().await.terminations.len() as u64)
    }
}

#[async_trait]
impl ReferenceStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn all_sites(&self) -> StoreResult<Vec<Site>> {
        let state = self.state.read().await;
        let sites = state.sites.values().cloned().collect();
        Ok(sorted_by_name(sites, |s: &Site| s.name.clone()))
    }

    async fn get_site(&self, id: SiteId) -> StoreResult<Option<Site>> {
        Ok(self.state.read().await.sites.get(&id).cloned())
    }

    async fn insert_site(&self, name: &str, slug: &str) -> StoreResult<Site> {
        let mut state = self.state.write().await;
        if state.sites.values().any(|s| s.slug == slug) {
            return Err(conflict("site", "slug"));
        }
        let site = Site {
            id: SiteId::new(),
            name: name.to_string(),
            slug: slug.to_string(),
        };
        state.sites.insert(site.id, site.clone());
        Ok(site)
    }

    async fn all_tenants(&self) -> StoreResult<Vec<Tenant>> {
        let state = self.state.read().await;
        let tenants = state.tenants.values().cloned().collect();
        Ok(sorted_by_name(tenants, |t: &Tenant| t.name.clone()))
    }

    async fn get_tenant(&self, id: TenantId) -> StoreResult<Option<Tenant>> {
        Ok(self.state.read().await.tenants.get(&id).cloned())
    }

    async fn find_tenant_by_name(&self, name: &str) -> StoreResult<Option<Tenant>> {
        let state = self.state.read().await;
        Ok(state.tenants.values().find(|t| t.name == name).cloned())
    }

    async fn insert_tenant(&self, name: &str, slug: &str) -> StoreResult<Tenant> {
        let mut state = self.state.write().await;
        if state.tenants.values().any(|t| t.slug == slug) {
            return Err(conflict("tenant", "slug"));
        }
        let tenant = Tenant {
            id: TenantId::new(),
            name: name.to_string(),
            slug: slug.to_string(),
        };
        state.tenants.insert(tenant.id, tenant.clone());
        Ok(tenant)
    }

    async fn graphs_exist(&self, graph_type: GraphType) -> StoreResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .graphs
            .iter()
            .any(|g| g.graph_type == graph_type.code()))
    }

    async fn insert_graph(
        &self,
        graph_type: GraphType,
        name: &str,
        source: &str,
    ) -> StoreResult<Graph> {
        let mut state = self.state.write().await;
        let graph = Graph {
            id: GraphId::new(),
            graph_type: graph_type.code(),
            weight: 1000,
            name: name.to_string(),
            source: source.to_string(),
        };
        state.graphs.push(graph.clone());
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_input(name: &str, slug: &str) -> ProviderInput {
        ProviderInput {
            name: name.to_string(),
            slug: slug.to_string(),
            ..Default::default()
        }
    }

    async fn seed_circuit(store: &MemoryStore, provider: &Provider, cid: &str) -> Circuit {
        let circuit_type = match store.get_circuit_type_by_slug("transit").await.unwrap() {
            Some(t) => t,
            None => store
                .insert_circuit_type(&CircuitTypeInput {
                    name: "Transit".to_string(),
                    slug: "transit".to_string(),
                })
                .await
                .unwrap(),
        };
        store
            .insert_circuit(&CircuitInput {
                cid: cid.to_string(),
                provider_id: provider.id,
                type_id: circuit_type.id,
                tenant_id: None,
                site_id: None,
                install_date: None,
                commit_rate: None,
                description: String::new(),
                comments: String::new(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_provider_slug_is_unique() {
        let store = MemoryStore::new();
        store
            .insert_provider(&provider_input("Acme", "acme"))
            .await
            .unwrap();
        let result = store.insert_provider(&provider_input("Acme 2", "acme")).await;
        assert!(matches!(
            result,
            Err(StoreError::Conflict {
                field: "slug",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_list_annotates_circuit_count() {
        let store = MemoryStore::new();
        let acme = store
            .insert_provider(&provider_input("Acme", "acme"))
            .await
            .unwrap();
        store
            .insert_provider(&provider_input("Zayo", "zayo"))
            .await
            .unwrap();
        seed_circuit(&store, &acme, "C-1").await;
        seed_circuit(&store, &acme, "C-2").await;

        let page = store
            .list_providers(&ProviderFilter::default(), PageRequest::new(1, 50))
            .await
            .unwrap();
        let counts: Vec<(String, i64)> = page
            .items
            .iter()
            .map(|r| (r.provider.name.clone(), r.count_circuits))
            .collect();
        assert_eq!(
            counts,
            vec![("Acme".to_string(), 2), ("Zayo".to_string(), 0)]
        );
    }

    #[tokio::test]
    async fn test_provider_delete_is_protected() {
        let store = MemoryStore::new();
        let acme = store
            .insert_provider(&provider_input("Acme", "acme"))
            .await
            .unwrap();
        seed_circuit(&store, &acme, "C-1").await;

        let result = store.delete_providers(&[acme.id]).await;
        assert!(matches!(result, Err(StoreError::Protected { count: 1, .. })));
        assert_eq!(store.count_providers().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_circuit_delete_cascades() {
        let store = MemoryStore::new();
        let acme = store
            .insert_provider(&provider_input("Acme", "acme"))
            .await
            .unwrap();
        let site = store.insert_site("DC1", "dc1").await.unwrap();
        let circuit = seed_circuit(&store, &acme, "C-1").await;
        store
            .insert_termination(
                circuit.id,
                &TerminationInput {
                    term_side: TermSide::A,
                    site_id: site.id,
                    port_speed: 1_000_000,
                    upstream_speed: None,
                    xconnect_id: String::new(),
                    pp_info: String::new(),
                },
            )
            .await
            .unwrap();

        assert_eq!(store.delete_circuits(&[circuit.id]).await.unwrap(), 1);
        assert_eq!(store.count_terminations().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_batch_insert_names_the_clashing_field() {
        let store = MemoryStore::new();
        let result = store
            .insert_providers(&[provider_input("Acme", "acme"), provider_input("Acme", "acme-2")])
            .await;
        assert!(matches!(
            result,
            Err(StoreError::Conflict { field: "name", .. })
        ));
    }

    #[tokio::test]
    async fn test_bulk_move_rejects_cids_colliding_within_the_selection() {
        let store = MemoryStore::new();
        let level3 = store
            .insert_provider(&provider_input("Level3", "level3"))
            .await
            .unwrap();
        let zayo = store
            .insert_provider(&provider_input("Zayo", "zayo"))
            .await
            .unwrap();
        let acme = store
            .insert_provider(&provider_input("Acme", "acme"))
            .await
            .unwrap();
        let first = seed_circuit(&store, &level3, "X").await;
        let second = seed_circuit(&store, &zayo, "X").await;

        let result = store
            .bulk_update_circuits(
                &[first.id, second.id],
                &CircuitBulkUpdate {
                    provider_id: Some(acme.id),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(StoreError::Conflict { field: "cid", .. })
        ));
        assert!(store.circuits_for_provider(acme.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_batch_insert_is_all_or_nothing() {
        let store = MemoryStore::new();
        let result = store
            .insert_providers(&[provider_input("A", "a"), provider_input("B", "a")])
            .await;
        assert!(result.is_err());
        assert_eq!(store.count_providers().await.unwrap(), 0);
    }
}

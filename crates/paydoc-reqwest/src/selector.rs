//! Requirement selection: choosing one offer from a 402 challenge.

use paydoc_types::amount::TokenAmount;
use paydoc_types::network::Network;
use paydoc_types::proto::PaymentRequirements;

/// Filters applied when choosing between server-offered payment requirements.
#[derive(Debug, Clone, Default)]
pub struct SelectorFilters {
    /// Only accept requirements settling on this network.
    pub network: Option<Network>,
    /// Only accept requirements using this payment scheme.
    pub scheme: Option<String>,
    /// Refuse requirements demanding more than this amount.
    pub max_value: Option<TokenAmount>,
}

/// Error returned when the filters eliminate every offered requirement.
///
/// Carries the filter values that failed, so callers can see why nothing
/// matched.
#[derive(Debug, Clone, thiserror::Error)]
#[error(
    "no acceptable payment requirement (network={network:?}, scheme={scheme:?}, max_value={max_value:?})"
)]
pub struct NoAcceptableRequirement {
    pub network: Option<Network>,
    pub scheme: Option<String>,
    pub max_value: Option<TokenAmount>,
}

/// Strategy that picks one requirement from the server's `accepts` list.
///
/// Implementations must be pure: the same inputs always yield the same
/// selection, with no I/O and no mutation. The interceptor takes the
/// strategy as an injected value, so callers can replace the policy
/// wholesale.
pub trait RequirementSelector: Send + Sync {
    fn select(
        &self,
        accepts: &[PaymentRequirements],
        filters: &SelectorFilters,
    ) -> Result<PaymentRequirements, NoAcceptableRequirement>;
}

/// Plain functions with the right signature work as selectors.
impl<F> RequirementSelector for F
where
    F: Fn(
            &[PaymentRequirements],
            &SelectorFilters,
        ) -> Result<PaymentRequirements, NoAcceptableRequirement>
        + Send
        + Sync,
{
    fn select(
        &self,
        accepts: &[PaymentRequirements],
        filters: &SelectorFilters,
    ) -> Result<PaymentRequirements, NoAcceptableRequirement> {
        self(accepts, filters)
    }
}

/// Default policy: the first offer, in server order, that passes every
/// provided filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstAcceptable;

impl RequirementSelector for FirstAcceptable {
    fn select(
        &self,
        accepts: &[PaymentRequirements],
        filters: &SelectorFilters,
    ) -> Result<PaymentRequirements, NoAcceptableRequirement> {
        accepts
            .iter()
            .find(|requirement| {
                filters
                    .network
                    .as_ref()
                    .is_none_or(|network| &requirement.network == network)
                    && filters
                        .scheme
                        .as_deref()
                        .is_none_or(|scheme| requirement.scheme == scheme)
                    && filters
                        .max_value
                        .is_none_or(|max| requirement.max_amount_required <= max)
            })
            .cloned()
            .ok_or_else(|| NoAcceptableRequirement {
                network: filters.network.clone(),
                scheme: filters.scheme.clone(),
                max_value: filters.max_value,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requirement(network: &str, scheme: &str, amount: u64) -> PaymentRequirements {
        PaymentRequirements {
            scheme: scheme.to_string(),
            network: Network::new(network),
            max_amount_required: TokenAmount::from(amount),
            resource: "/resource".to_string(),
            description: String::new(),
            mime_type: "application/json".to_string(),
            output_schema: None,
            pay_to: "0x209693Bc6afc0C5328bA36FaF03C514EF312287C".to_string(),
            max_timeout_seconds: 300,
            asset: "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913".to_string(),
            extra: None,
        }
    }

    #[test]
    fn no_filters_picks_first_offer() {
        let accepts = [requirement("base", "exact", 10), requirement("polygon", "exact", 5)];
        let selected = FirstAcceptable
            .select(&accepts, &SelectorFilters::default())
            .unwrap();
        assert_eq!(selected.network, "base");
    }

    #[test]
    fn network_filter_skips_non_matching_offers() {
        let accepts = [requirement("base", "exact", 10), requirement("polygon", "exact", 5)];
        let filters = SelectorFilters {
            network: Some(Network::new("polygon")),
            ..Default::default()
        };
        let selected = FirstAcceptable.select(&accepts, &filters).unwrap();
        assert_eq!(selected.network, "polygon");
    }

    #[test]
    fn scheme_filter_applies() {
        let accepts = [requirement("base", "exact", 10), requirement("base", "upto", 5)];
        let filters = SelectorFilters {
            scheme: Some("upto".to_string()),
            ..Default::default()
        };
        let selected = FirstAcceptable.select(&accepts, &filters).unwrap();
        assert_eq!(selected.scheme, "upto");
    }

    #[test]
    fn max_value_is_inclusive() {
        let accepts = [requirement("base", "exact", 1000)];
        let at_limit = SelectorFilters {
            max_value: Some(TokenAmount::from(1000u64)),
            ..Default::default()
        };
        assert!(FirstAcceptable.select(&accepts, &at_limit).is_ok());

        let below_limit = SelectorFilters {
            max_value: Some(TokenAmount::from(999u64)),
            ..Default::default()
        };
        assert!(FirstAcceptable.select(&accepts, &below_limit).is_err());
    }

    #[test]
    fn empty_accepts_fails_with_filters_reported() {
        let filters = SelectorFilters {
            network: Some(Network::new("base")),
            ..Default::default()
        };
        let err = FirstAcceptable.select(&[], &filters).unwrap_err();
        assert_eq!(err.network, Some(Network::new("base")));
        assert!(err.scheme.is_none());
    }

    #[test]
    fn closures_work_as_selectors() {
        let last_offer = |accepts: &[PaymentRequirements], filters: &SelectorFilters| {
            accepts.last().cloned().ok_or_else(|| NoAcceptableRequirement {
                network: filters.network.clone(),
                scheme: filters.scheme.clone(),
                max_value: filters.max_value,
            })
        };
        let accepts = [requirement("base", "exact", 10), requirement("polygon", "exact", 5)];
        let selected = last_offer.select(&accepts, &SelectorFilters::default()).unwrap();
        assert_eq!(selected.network, "polygon");
    }
}

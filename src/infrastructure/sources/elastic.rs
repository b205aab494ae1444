// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{Months, Utc};
use serde::Serialize;

use crate::domain::models::filters::ProcurementStatus;
use crate::domain::search::source::HarvestError;

/// Search document POSTed to the commercial portal as the `xmlData` form
/// field. Element names and nesting are the portal's wire contract and must
/// not drift.
#[derive(Debug, Clone, Serialize)]
#[serde(rename = "elasticrequest")]
pub struct ElasticRequest {
    pub personid: i64,
    pub buid: i64,
    pub filters: Filters,
    pub fields: Fields,
    pub sort: Sort,
    pub aggregations: Aggregations,
    pub size: u32,
    pub from: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Filters {
    #[serde(rename = "mainSearchBar")]
    pub main_search_bar: SearchBar,
    #[serde(rename = "purchAmount")]
    pub purch_amount: RangeFilter,
    #[serde(rename = "PublicDate")]
    pub public_date: RangeFilter,
    #[serde(rename = "PurchaseStageTerm")]
    pub purchase_stage: TermFilter,
    #[serde(rename = "SourceTerm")]
    pub source_term: TermFilter,
    #[serde(rename = "RegionNameTerm")]
    pub region_name: TermFilter,
    #[serde(rename = "RequestStartDate")]
    pub request_start_date: RangeFilter,
    #[serde(rename = "RequestDate")]
    pub request_date: RangeFilter,
    #[serde(rename = "AuctionBeginDate")]
    pub auction_begin_date: RangeFilter,
    #[serde(rename = "okdp2MultiMatch")]
    pub okdp2_multi_match: ValueFilter,
    #[serde(rename = "okdp2tree")]
    pub okdp2_tree: TreeFilter,
    #[serde(rename = "classifier")]
    pub classifier: VisibleFilter,
    #[serde(rename = "orgCondition")]
    pub org_condition: ValueFilter,
    #[serde(rename = "orgDictionary")]
    pub org_dictionary: ValueFilter,
    #[serde(rename = "organizator")]
    pub organizator: VisibleFilter,
    #[serde(rename = "CustomerCondition")]
    pub customer_condition: ValueFilter,
    #[serde(rename = "CustomerDictionary")]
    pub customer_dictionary: ValueFilter,
    #[serde(rename = "customer")]
    pub customer: VisibleFilter,
    #[serde(rename = "PurchaseWayTerm")]
    pub purchase_way: TermFilter,
    #[serde(rename = "PurchaseTypeNameTerm")]
    pub purchase_type_name: TermFilter,
    #[serde(rename = "BranchNameTerm")]
    pub branch_name: TermFilter,
    #[serde(rename = "isSharedTerm")]
    pub is_shared: TermFilter,
    #[serde(rename = "isHasComplaint")]
    pub is_has_complaint: ValueFilter,
    #[serde(rename = "isPurchCostDetails")]
    pub is_purch_cost_details: ValueFilter,
    #[serde(rename = "notificationFeatures")]
    pub notification_features: TermFilter,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchBar {
    pub value: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub minimum_should_match: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RangeFilter {
    pub minvalue: String,
    pub maxvalue: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TermFilter {
    pub value: String,
    pub visiblepart: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValueFilter {
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TreeFilter {
    pub value: String,
    #[serde(rename = "productField")]
    pub product_field: String,
    #[serde(rename = "branchField")]
    pub branch_field: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VisibleFilter {
    pub visiblepart: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Fields {
    pub field: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Sort {
    pub value: String,
    pub direction: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Aggregations {
    pub empty: EmptyAggregation,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EmptyAggregation {
    #[serde(rename = "filterType")]
    pub filter_type: String,
    pub field: String,
}

/// Hit fields requested from the search index.
const REQUESTED_FIELDS: [&str; 26] = [
    "TradeSectionId",
    "purchAmount",
    "purchCurrency",
    "purchCodeTerm",
    "PurchaseTypeName",
    "purchStateName",
    "BidStatusName",
    "OrgName",
    "SourceTerm",
    "PublicDate",
    "RequestDate",
    "RequestStartDate",
    "RequestAcceptDate",
    "EndDate",
    "CreateRequestHrefTerm",
    "CreateRequestAlowed",
    "purchName",
    "BidName",
    "SourceHrefTerm",
    "objectHrefTerm",
    "needPayment",
    "IsSMP",
    "isIncrease",
    "isHasComplaint",
    "isPurchCostDetails",
    "purchType",
];

impl ElasticRequest {
    /// Build the search document for one phrase.
    ///
    /// A zero minimum price is serialized as an explicit `"0"`; the portal
    /// treats a missing `minvalue` differently. When the status mode is
    /// constrained, the publication-date floor is set to two years back.
    pub fn new(phrase: &str, min_price: u64, status: ProcurementStatus, size: u32) -> Self {
        let mut public_date = RangeFilter::default();
        if status == ProcurementStatus::Active {
            if let Some(floor) = Utc::now().date_naive().checked_sub_months(Months::new(24)) {
                public_date.minvalue = floor.format("%d.%m.%Y").to_string();
            }
        }

        Self {
            personid: 0,
            buid: 0,
            filters: Filters {
                main_search_bar: SearchBar {
                    value: phrase.to_string(),
                    kind: "best_fields".to_string(),
                    minimum_should_match: "1%".to_string(),
                },
                purch_amount: RangeFilter {
                    minvalue: min_price.to_string(),
                    maxvalue: String::new(),
                },
                public_date,
                purchase_stage: TermFilter {
                    value: "Опубликовано|;|Подача заявок".to_string(),
                    visiblepart: "Опубликовано,Подача заявок".to_string(),
                },
                source_term: TermFilter::default(),
                region_name: TermFilter::default(),
                request_start_date: RangeFilter::default(),
                request_date: RangeFilter::default(),
                auction_begin_date: RangeFilter::default(),
                okdp2_multi_match: ValueFilter::default(),
                okdp2_tree: TreeFilter::default(),
                classifier: VisibleFilter::default(),
                org_condition: ValueFilter::default(),
                org_dictionary: ValueFilter::default(),
                organizator: VisibleFilter::default(),
                customer_condition: ValueFilter::default(),
                customer_dictionary: ValueFilter::default(),
                customer: VisibleFilter::default(),
                purchase_way: TermFilter::default(),
                purchase_type_name: TermFilter::default(),
                branch_name: TermFilter::default(),
                is_shared: TermFilter::default(),
                is_has_complaint: ValueFilter::default(),
                is_purch_cost_details: ValueFilter::default(),
                notification_features: TermFilter::default(),
            },
            fields: Fields {
                field: REQUESTED_FIELDS.iter().map(|f| f.to_string()).collect(),
            },
            sort: Sort {
                value: "default".to_string(),
                direction: String::new(),
            },
            aggregations: Aggregations {
                empty: EmptyAggregation {
                    filter_type: "filter_aggregation".to_string(),
                    field: String::new(),
                },
            },
            size,
            from: 0,
        }
    }

    pub fn to_xml(&self) -> Result<String, HarvestError> {
        quick_xml::se::to_string(self).map_err(|e| HarvestError::Request(e.to_string()))
    }
}

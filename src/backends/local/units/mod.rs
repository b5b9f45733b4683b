// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in units, grouped by what they touch.

mod checks;
mod columns;
mod dates;
mod flow;
mod gather;
mod io;
mod merge;

pub use checks::{CheckTypes, CheckTypesConfig, CHECK_TYPES};
pub use columns::{
    BinaryReplace, BinaryReplaceConfig, CastColumns, CastColumnsConfig, FillNulls,
    FillNullsConfig, ReplacePattern, ReplacePatternConfig, ReplacementRules, BINARY_REPLACE,
    CAST_COLUMNS, FILL_NULLS, REPLACE_PATTERN,
};
pub use dates::{
    FormatDates, FormatDatesConfig, GenerateTimestamp, GenerateTimestampConfig, SplitTime,
    SplitTimeConfig, FORMAT_DATES, GENERATE_TIMESTAMP, SPLIT_TIME,
};
pub use flow::{
    ConditionalFlow, FnTransformer, LogMessage, LogMessageConfig, Predicate, CONDITIONAL_FLOW,
    FUNCTION, LOG_MESSAGE,
};
pub use gather::{FanOut, GatherAndReduce, GatherInputs, FAN_OUT, GATHER, GATHER_AND_REDUCE};
pub use io::{
    ReadTable, ReadTableConfig, WriteMany, WriteManyConfig, WriteTable, WriteTableConfig,
    READ_TABLE, WRITE_MANY, WRITE_TABLE,
};
pub use merge::{MergeConfig, MergeMethod, MergeTables, MERGE};

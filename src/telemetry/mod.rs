pub mod config;
pub mod ctx;
pub mod ops;
pub mod sink;

use std::marker::PhantomData;

use ctx::{LogCtx, OpMarker};

fn ctx<O: OpMarker>() -> LogCtx<O> { LogCtx { json: config::logs_are_json(), _marker: PhantomData } }

pub fn init() -> LogCtx<ops::init::Init> { ctx() }
pub fn collect() -> LogCtx<ops::collect::Collect> { ctx() }
pub fn status() -> LogCtx<ops::status::Status> { ctx() }
pub fn sources() -> LogCtx<ops::sources::Sources> { ctx() }
pub fn items() -> LogCtx<ops::items::Items> { ctx() }

use std::fmt;

use mongodb::bson::oid::ObjectId;
use serde::{Serialize, Serializer};

/// 产品标识
///
/// 关系型后端使用自增整数，MongoDB 使用 12 字节的 ObjectId。
/// JSON 中整数输出为 number，ObjectId 输出为 24 位十六进制字符串。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductId {
    Integer(u64),
    Object(ObjectId),
}

/// 后端接受的标识类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Integer,
    Object,
}

impl ProductId {
    /// 解析路径参数：先尝试 ObjectId（24 位十六进制），否则按无符号十进制整数解析。
    pub fn parse(raw: &str) -> Option<Self> {
        if let Ok(oid) = ObjectId::parse_str(raw) {
            return Some(ProductId::Object(oid));
        }
        raw.parse::<u64>().ok().map(ProductId::Integer)
    }

    pub fn kind(&self) -> IdKind {
        match self {
            ProductId::Integer(_) => IdKind::Integer,
            ProductId::Object(_) => IdKind::Object,
        }
    }

    pub fn as_integer(&self) -> Option<u64> {
        match self {
            ProductId::Integer(id) => Some(*id),
            ProductId::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            ProductId::Object(oid) => Some(*oid),
            ProductId::Integer(_) => None,
        }
    }
}

impl IdKind {
    /// 按当前后端解析路径参数，类型不匹配时同样视为无效。
    pub fn parse(self, raw: &str) -> Option<ProductId> {
        ProductId::parse(raw).filter(|id| id.kind() == self)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Integer(id) => write!(f, "{}", id),
            ProductId::Object(oid) => write!(f, "{}", oid.to_hex()),
        }
    }
}

impl Serialize for ProductId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ProductId::Integer(id) => serializer.serialize_u64(*id),
            ProductId::Object(oid) => serializer.serialize_str(&oid.to_hex()),
        }
    }
}

/// 所有后端都能存储的库存上限（PostgreSQL 为 INTEGER）
pub const MAX_STOCK: u32 = i32::MAX as u32;

/// 库存超出 [`MAX_STOCK`] 时返回 false
pub fn stock_in_range(stock: u32) -> bool {
    stock <= MAX_STOCK
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub stock: u32,
}

/// 尚未持久化的产品，id 由存储层分配
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub stock: u32,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, stock: u32) -> Self {
        Self {
            name: name.into(),
            stock,
        }
    }

    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            stock: self.stock,
        }
    }
}

impl Product {
    /// 部分更新：非空 name、非零 stock 才会覆盖原值
    pub fn merge(&mut self, name: Option<String>, stock: Option<u32>) {
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            self.name = name;
        }
        if let Some(stock) = stock.filter(|s| *s != 0) {
            self.stock = stock;
        }
    }
}

//! Dynamic message instances.

use std::sync::Arc;

use crate::error::SchemaError;
use crate::field::FieldDescriptor;
use crate::message::MessageDescriptor;
use crate::scalar::Scalar;

#[derive(Debug, Clone, PartialEq)]
enum FieldValue {
    Scalar(Scalar),
    // `None` is the unset state; `Some` may hold an all-default child.
    Message(Option<Box<DynamicMessage>>),
    ScalarList(Vec<Scalar>),
    MessageList(Vec<DynamicMessage>),
}

impl FieldValue {
    fn default_for(field: &FieldDescriptor) -> Self {
        match (field.is_repeated(), field.scalar_kind()) {
            (false, Some(kind)) => Self::Scalar(kind.default_value()),
            (false, None) => Self::Message(None),
            (true, Some(_)) => Self::ScalarList(Vec::new()),
            (true, None) => Self::MessageList(Vec::new()),
        }
    }
}

/// An instance of a message type described at runtime.
///
/// Every field holds a value from construction on: primitive fields start at
/// their zero value, repeated fields empty and singular message fields unset.
/// Accessors take a [`FieldDescriptor`] of this message's own type; the
/// name-based helpers ([`get`], [`set`], [`push`], [`child_mut`], ...) look
/// the descriptor up first.
///
/// ```
/// use msgdoc_schema::{DynamicMessage, FieldType, MessageDescriptor, Scalar};
///
/// let descriptor = MessageDescriptor::builder("test.Test")
///     .field("id", FieldType::Int32)
///     .repeated("tags", FieldType::String)
///     .build()
///     .unwrap();
/// let mut msg = DynamicMessage::new(descriptor);
/// msg.set("id", 123).unwrap();
/// msg.push("tags", "a").unwrap();
///
/// assert_eq!(msg.get("id").unwrap(), &Scalar::Int32(123));
/// assert_eq!(msg.get_list("tags").unwrap().len(), 1);
/// ```
///
/// [`get`]: DynamicMessage::get
/// [`set`]: DynamicMessage::set
/// [`push`]: DynamicMessage::push
/// [`child_mut`]: DynamicMessage::child_mut
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicMessage {
    descriptor: Arc<MessageDescriptor>,
    values: Vec<FieldValue>,
}

impl DynamicMessage {
    pub fn new(descriptor: Arc<MessageDescriptor>) -> Self {
        let values = descriptor.fields().iter().map(FieldValue::default_for).collect();
        Self { descriptor, values }
    }

    /// A message whose fields are all singular primitives, holding `scalars`
    /// in declaration order.
    pub(crate) fn from_scalars(
        descriptor: Arc<MessageDescriptor>,
        scalars: impl IntoIterator<Item = Scalar>,
    ) -> Self {
        let values = scalars.into_iter().map(FieldValue::Scalar).collect();
        Self { descriptor, values }
    }

    #[inline]
    pub fn descriptor(&self) -> &Arc<MessageDescriptor> {
        &self.descriptor
    }

    /// Resets every field to its type's default.
    pub fn clear(&mut self) {
        for (value, field) in self.values.iter_mut().zip(self.descriptor.fields()) {
            *value = FieldValue::default_for(field);
        }
    }

    /// Resets a single field to its default.
    pub fn clear_field(&mut self, field: &FieldDescriptor) -> Result<(), SchemaError> {
        let slot = self.slot_mut(field)?;
        *slot = FieldValue::default_for(field);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Descriptor-addressed access

    fn unknown_field(&self, field: &FieldDescriptor) -> SchemaError {
        SchemaError::UnknownField {
            message: self.descriptor.full_name().to_owned(),
            field: field.name().to_owned(),
        }
    }

    fn wrong_shape(&self, field: &FieldDescriptor, expected: &'static str) -> SchemaError {
        SchemaError::WrongFieldShape {
            message: self.descriptor.full_name().to_owned(),
            field: field.name().to_owned(),
            expected,
        }
    }

    fn slot(&self, field: &FieldDescriptor) -> Result<&FieldValue, SchemaError> {
        if !self.descriptor.owns(field) {
            return Err(self.unknown_field(field));
        }
        self.values
            .get(field.index())
            .ok_or_else(|| self.unknown_field(field))
    }

    fn slot_mut(&mut self, field: &FieldDescriptor) -> Result<&mut FieldValue, SchemaError> {
        if !self.descriptor.owns(field) {
            return Err(self.unknown_field(field));
        }
        let err = self.unknown_field(field);
        self.values.get_mut(field.index()).ok_or(err)
    }

    fn assignable(field: &FieldDescriptor, value: Scalar) -> Result<Scalar, SchemaError> {
        let kind = field.scalar_kind().ok_or_else(|| SchemaError::TypeMismatch {
            field: field.name().to_owned(),
            expected: "message",
            found: value.kind().as_str(),
        })?;
        let found = value.kind().as_str();
        value.coerce(kind).ok_or_else(|| SchemaError::TypeMismatch {
            field: field.name().to_owned(),
            expected: kind.as_str(),
            found,
        })
    }

    /// Value of a singular primitive field.
    pub fn scalar(&self, field: &FieldDescriptor) -> Result<&Scalar, SchemaError> {
        match self.slot(field)? {
            FieldValue::Scalar(v) => Ok(v),
            _ => Err(self.wrong_shape(field, "singular primitive")),
        }
    }

    /// Assigns a singular primitive field, converting the value as
    /// [`Scalar::coerce`] allows.
    pub fn set_scalar(&mut self, field: &FieldDescriptor, value: Scalar) -> Result<(), SchemaError> {
        if !matches!(self.slot(field)?, FieldValue::Scalar(_)) {
            return Err(self.wrong_shape(field, "singular primitive"));
        }
        let value = Self::assignable(field, value)?;
        *self.slot_mut(field)? = FieldValue::Scalar(value);
        Ok(())
    }

    /// Elements of a repeated primitive field.
    pub fn scalars(&self, field: &FieldDescriptor) -> Result<&[Scalar], SchemaError> {
        match self.slot(field)? {
            FieldValue::ScalarList(v) => Ok(v),
            _ => Err(self.wrong_shape(field, "repeated primitive")),
        }
    }

    /// Appends to a repeated primitive field.
    pub fn push_scalar(&mut self, field: &FieldDescriptor, value: Scalar) -> Result<(), SchemaError> {
        if !matches!(self.slot(field)?, FieldValue::ScalarList(_)) {
            return Err(self.wrong_shape(field, "repeated primitive"));
        }
        let value = Self::assignable(field, value)?;
        if let FieldValue::ScalarList(list) = self.slot_mut(field)? {
            list.push(value);
        }
        Ok(())
    }

    /// Presence bit of a singular message field.
    pub fn has_message(&self, field: &FieldDescriptor) -> Result<bool, SchemaError> {
        Ok(self.message(field)?.is_some())
    }

    /// The child of a singular message field, `None` when unset.
    pub fn message(&self, field: &FieldDescriptor) -> Result<Option<&DynamicMessage>, SchemaError> {
        match self.slot(field)? {
            FieldValue::Message(child) => Ok(child.as_deref()),
            _ => Err(self.wrong_shape(field, "singular message")),
        }
    }

    /// The child of a singular message field, created (and marked present)
    /// if it was unset.
    pub fn message_mut(&mut self, field: &FieldDescriptor) -> Result<&mut DynamicMessage, SchemaError> {
        let child_type = field.message_type().cloned();
        let shape_err = self.wrong_shape(field, "singular message");
        match (self.slot_mut(field)?, child_type) {
            (FieldValue::Message(child), Some(ty)) => {
                Ok(&mut **child.get_or_insert_with(|| Box::new(DynamicMessage::new(ty))))
            }
            _ => Err(shape_err),
        }
    }

    /// Replaces the child of a singular message field.
    pub fn set_message(&mut self, field: &FieldDescriptor, value: DynamicMessage) -> Result<(), SchemaError> {
        self.check_child_type(field, &value)?;
        let shape_err = self.wrong_shape(field, "singular message");
        match self.slot_mut(field)? {
            FieldValue::Message(child) => {
                *child = Some(Box::new(value));
                Ok(())
            }
            _ => Err(shape_err),
        }
    }

    /// Elements of a repeated message field.
    pub fn messages(&self, field: &FieldDescriptor) -> Result<&[DynamicMessage], SchemaError> {
        match self.slot(field)? {
            FieldValue::MessageList(v) => Ok(v),
            _ => Err(self.wrong_shape(field, "repeated message")),
        }
    }

    /// Appends a default child to a repeated message field and returns it.
    pub fn add_message(&mut self, field: &FieldDescriptor) -> Result<&mut DynamicMessage, SchemaError> {
        let child_type = field.message_type().cloned();
        let shape_err = self.wrong_shape(field, "repeated message");
        match (self.slot_mut(field)?, child_type) {
            (FieldValue::MessageList(list), Some(ty)) => {
                list.push(DynamicMessage::new(ty));
                let last = list.len() - 1;
                Ok(&mut list[last])
            }
            _ => Err(shape_err),
        }
    }

    /// Appends an existing child to a repeated message field.
    pub fn push_message(&mut self, field: &FieldDescriptor, value: DynamicMessage) -> Result<(), SchemaError> {
        self.check_child_type(field, &value)?;
        let shape_err = self.wrong_shape(field, "repeated message");
        match self.slot_mut(field)? {
            FieldValue::MessageList(list) => {
                list.push(value);
                Ok(())
            }
            _ => Err(shape_err),
        }
    }

    fn check_child_type(&self, field: &FieldDescriptor, value: &DynamicMessage) -> Result<(), SchemaError> {
        let Some(expected) = field.message_type() else {
            return Err(self.wrong_shape(field, "message"));
        };
        if Arc::ptr_eq(expected, &value.descriptor) || **expected == *value.descriptor {
            return Ok(());
        }
        Err(SchemaError::MessageTypeMismatch {
            field: field.name().to_owned(),
            expected: expected.full_name().to_owned(),
            found: value.descriptor.full_name().to_owned(),
        })
    }

    // ---------------------------------------------------------------------
    // Name-addressed helpers

    fn field_named(&self, name: &str) -> Result<(Arc<MessageDescriptor>, usize), SchemaError> {
        match self.descriptor.index_of(name) {
            Some(i) => Ok((Arc::clone(&self.descriptor), i)),
            None => Err(SchemaError::UnknownField {
                message: self.descriptor.full_name().to_owned(),
                field: name.to_owned(),
            }),
        }
    }

    pub fn get(&self, name: &str) -> Result<&Scalar, SchemaError> {
        let (d, i) = self.field_named(name)?;
        self.scalar(&d.fields()[i])
    }

    pub fn set(&mut self, name: &str, value: impl Into<Scalar>) -> Result<(), SchemaError> {
        let (d, i) = self.field_named(name)?;
        self.set_scalar(&d.fields()[i], value.into())
    }

    pub fn get_list(&self, name: &str) -> Result<&[Scalar], SchemaError> {
        let (d, i) = self.field_named(name)?;
        self.scalars(&d.fields()[i])
    }

    pub fn push(&mut self, name: &str, value: impl Into<Scalar>) -> Result<(), SchemaError> {
        let (d, i) = self.field_named(name)?;
        self.push_scalar(&d.fields()[i], value.into())
    }

    pub fn child(&self, name: &str) -> Result<Option<&DynamicMessage>, SchemaError> {
        let (d, i) = self.field_named(name)?;
        self.message(&d.fields()[i])
    }

    pub fn child_mut(&mut self, name: &str) -> Result<&mut DynamicMessage, SchemaError> {
        let (d, i) = self.field_named(name)?;
        self.message_mut(&d.fields()[i])
    }

    pub fn children(&self, name: &str) -> Result<&[DynamicMessage], SchemaError> {
        let (d, i) = self.field_named(name)?;
        self.messages(&d.fields()[i])
    }

    pub fn add_child(&mut self, name: &str) -> Result<&mut DynamicMessage, SchemaError> {
        let (d, i) = self.field_named(name)?;
        self.add_message(&d.fields()[i])
    }
}

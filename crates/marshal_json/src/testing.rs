//! Bean types shared by the serializer and parser tests.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use std::sync::LazyLock;

use marshal_reflect::bean::PropertyValue;
use marshal_reflect::{
    Bean, BeanDictionary, BeanMeta, PropertyError, PropertyMeta, TypeHandle, TypeKind, Value,
};

static DOG: LazyLock<TypeHandle> = LazyLock::new(|| {
    TypeHandle::bean::<Dog>(
        BeanMeta::new("Dog")
            .with_property(PropertyMeta::new("name", TypeHandle::string()))
            .with_property(PropertyMeta::new("barks", TypeHandle::bool()))
            .with_constructor(|| Box::new(Dog::new(""))),
    )
    .with_dictionary_name("dog")
});

static CAT: LazyLock<TypeHandle> = LazyLock::new(|| {
    TypeHandle::bean::<Cat>(
        BeanMeta::new("Cat")
            .with_property(PropertyMeta::new("name", TypeHandle::string()))
            .with_property(PropertyMeta::new("lives", TypeHandle::integer()))
            .with_constructor(|| Box::new(Cat::default())),
    )
    .with_dictionary_name("cat")
});

static ANIMAL: LazyLock<TypeHandle> = LazyLock::new(|| {
    TypeHandle::abstract_bean("Animal").with_dictionary(
        BeanDictionary::new()
            .with("dog", DOG.clone())
            .with("cat", CAT.clone()),
    )
});

static PERSON: LazyLock<TypeHandle> = LazyLock::new(|| {
    TypeHandle::bean::<Person>(
        BeanMeta::new("Person")
            .with_property(PropertyMeta::new("name", TypeHandle::string()))
            .with_property(PropertyMeta::new("home", TypeHandle::string()).as_uri())
            .with_property(PropertyMeta::new("pet", ANIMAL.clone()))
            .with_constructor(|| Box::new(Person::default())),
    )
});

pub fn dog_type() -> TypeHandle {
    DOG.clone()
}

pub fn cat_type() -> TypeHandle {
    CAT.clone()
}

pub fn animal_type() -> TypeHandle {
    ANIMAL.clone()
}

pub fn person_type() -> TypeHandle {
    PERSON.clone()
}

pub fn person(name: &str, home: &str) -> Value {
    Value::bean(Person {
        name: String::from(name),
        home: String::from(home),
        pet: None,
    })
}

fn mismatch(name: &str, expected: TypeKind, value: &Value) -> PropertyError {
    PropertyError::mismatch(name, expected, value)
}

// -----------------------------------------------------------------------------
// Dog

#[derive(Debug)]
pub struct Dog {
    pub name: String,
    pub barks: bool,
}

impl Dog {
    pub fn new(name: &str) -> Self {
        Self {
            name: String::from(name),
            barks: true,
        }
    }
}

impl Bean for Dog {
    fn type_handle(&self) -> TypeHandle {
        dog_type()
    }

    fn properties(&self) -> Vec<PropertyValue> {
        DOG.property_values([Value::from(self.name.as_str()), Value::from(self.barks)])
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        match (name, value) {
            ("name", Value::String(v)) => self.name = v,
            ("barks", Value::Bool(v)) => self.barks = v,
            (name, value) => return Err(mismatch(name, TypeKind::Any, &value)),
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Cat

#[derive(Debug, Default)]
pub struct Cat {
    pub name: String,
    pub lives: i64,
}

impl Bean for Cat {
    fn type_handle(&self) -> TypeHandle {
        cat_type()
    }

    fn properties(&self) -> Vec<PropertyValue> {
        CAT.property_values([Value::from(self.name.as_str()), Value::from(self.lives)])
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        match name {
            "name" => {
                self.name = value
                    .as_str()
                    .map(String::from)
                    .ok_or_else(|| mismatch(name, TypeKind::String, &value))?;
            }
            "lives" => {
                self.lives = value
                    .as_i64()
                    .ok_or_else(|| mismatch(name, TypeKind::Integer, &value))?;
            }
            _ => return Err(PropertyError::Unknown(String::from(name))),
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Person

#[derive(Debug, Default)]
pub struct Person {
    pub name: String,
    pub home: String,
    pub pet: Option<Value>,
}

impl Bean for Person {
    fn type_handle(&self) -> TypeHandle {
        person_type()
    }

    fn properties(&self) -> Vec<PropertyValue> {
        PERSON.property_values([
            Value::from(self.name.as_str()),
            Value::from(self.home.as_str()),
            Value::from(self.pet.clone()),
        ])
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        match (name, value) {
            ("name", Value::String(v)) => self.name = v,
            ("home", Value::String(v) | Value::Uri(v)) => self.home = v,
            ("pet", Value::Null) => self.pet = None,
            ("pet", pet @ Value::Bean(_)) => self.pet = Some(pet),
            (name, value) => return Err(mismatch(name, TypeKind::Any, &value)),
        }
        Ok(())
    }
}

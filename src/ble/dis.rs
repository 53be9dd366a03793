//! Device Information Service (0x180A).

use ess_sensor::config;
use ess_sensor::error::BleError;
use heapless::String;

#[nrf_softdevice::gatt_service(uuid = "180a")]
pub struct DeviceInformationService {
    #[characteristic(uuid = "2a29", read)]
    pub manufacturer_name: String<32>,
    #[characteristic(uuid = "2a24", read)]
    pub model_number: String<32>,
}

impl DeviceInformationService {
    /// Write the fixed identification strings into the attribute table.
    pub fn populate(&self) -> Result<(), BleError> {
        let manufacturer =
            String::try_from(config::DIS_MANUFACTURER).map_err(|_| BleError::SetValue)?;
        let model = String::try_from(config::DIS_MODEL).map_err(|_| BleError::SetValue)?;

        self.manufacturer_name_set(&manufacturer)
            .map_err(|_| BleError::SetValue)?;
        self.model_number_set(&model).map_err(|_| BleError::SetValue)?;
        Ok(())
    }
}

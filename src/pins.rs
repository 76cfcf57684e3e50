use embassy_stm32::peripherals::*;
use embassy_stm32::{bind_interrupts, usart};

//////////////////////
//  switched ports  //
//////////////////////

// enable lines are active low
pub type Port0PowerEnablePin = PB0;
pub type Port1PowerEnablePin = PB1;
pub type Port2PowerEnablePin = PB2;
pub type Port3PowerEnablePin = PB3;
pub type Port4PowerEnablePin = PB4;
pub type Port5PowerEnablePin = PB5;
pub type Port6PowerEnablePin = PB6;
pub type Port7PowerEnablePin = PB7;

// rising edge = fault asserted
pub type Port0FaultSensePin = PC8;
pub type Port1FaultSensePin = PC9;
pub type Port2FaultSensePin = PC10;
pub type Port3FaultSensePin = PC11;
pub type Port4FaultSensePin = PC12;
pub type Port5FaultSensePin = PC13;
pub type Port6FaultSensePin = PC14;
pub type Port7FaultSensePin = PC15;

pub type Port0FaultExti = EXTI8;
pub type Port1FaultExti = EXTI9;
pub type Port2FaultExti = EXTI10;
pub type Port3FaultExti = EXTI11;
pub type Port4FaultExti = EXTI12;
pub type Port5FaultExti = EXTI13;
pub type Port6FaultExti = EXTI14;
pub type Port7FaultExti = EXTI15;

/////////////////////
//  current sense  //
/////////////////////

pub type CurrentSenseMuxSel0Pin = PB8;
pub type CurrentSenseMuxSel1Pin = PB9;

pub type CurrentSenseBankAAdc = ADC1;
pub type CurrentSenseBankAPin = PA0;
pub type CurrentSenseBankADma = DMA1_CH1;

pub type CurrentSenseBankBAdc = ADC2;
pub type CurrentSenseBankBPin = PA4;
pub type CurrentSenseBankBDma = DMA1_CH2;

///////////////
//  user IO  //
///////////////

pub type StatusLedPin = PA5;

////////////
//  coms  //
////////////

pub type ComsUart = USART1;
pub type ComsUartTxPin = PA9;
pub type ComsUartRxPin = PA10;
pub type ComsDmaTx = DMA1_CH3;
pub type ComsDmaRx = DMA1_CH4;

bind_interrupts!(pub struct SystemIrqs {
    USART1 => usart::InterruptHandler<USART1>;
});
